//! CLI command implementations

pub mod chat;
pub mod grid;
pub mod text;
