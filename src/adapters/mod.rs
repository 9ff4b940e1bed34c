//! Storage backends for saved chatbots.
//!
//! Both types implement [`crate::ports::ModelRepository`]; the app container
//! picks one at build time.

pub mod in_memory_repository;
pub mod msgpack_repository;

pub use in_memory_repository::InMemoryRepository;
pub use msgpack_repository::MsgPackRepository;
