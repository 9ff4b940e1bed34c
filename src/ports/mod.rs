//! Ports (trait boundaries) for external dependencies.
//!
//! This module defines the interfaces between the agent core and everything
//! it is driven by or reports to: environments, observers and storage.

pub mod environment;
pub mod observer;
pub mod repository;

pub use environment::{Environment, Step};
pub use observer::{EpisodeSummary, GrowthEvent, Observer};
pub use repository::ModelRepository;
