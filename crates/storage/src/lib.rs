//! Local key-value storage for the chat client.
//!
//! Mirrors the browser "local storage" contract: string keys mapped to string
//! values that survive a restart. [`FileStore`] persists to a JSON file,
//! [`MemoryStore`] keeps everything in process.

pub mod error;
pub mod file;
pub mod memory;

pub use error::{StorageError, StorageResult};
pub use file::FileStore;
pub use memory::MemoryStore;

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
    fn remove(&self, key: &str) -> StorageResult<()>;
}
