//! Toy environments for the agent core
//!
//! These sit outside the core and talk to it only through
//! [`crate::ports::Environment`] and the agent's episode driver API.

pub mod grid;
pub mod letters;

pub use grid::{GridWorld, Move};
pub use letters::LetterChain;
