//! CLI infrastructure for the qlearn toolkit
//!
//! This module provides the command-line interface for training agents on
//! the grid world, the letter chain and Q&A chatbots.

pub mod commands;
pub mod config;
pub mod output;
