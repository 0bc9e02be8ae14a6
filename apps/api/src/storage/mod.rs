//! Key/value persistence layer.
//!
//! The service keeps all state in a single flat key/value namespace, the
//! way the browser-local store it replaces did. `KvStore` is the seam:
//! the file-backed implementation is used in production, the in-memory
//! one in tests. All typed access goes through `Repository`; handlers
//! never touch raw keys.

pub mod kv;
pub mod repository;

pub use kv::{JsonFileStore, KvStore, MemoryStore};
pub use repository::Repository;
