//! Persistence of the per-chat queue record.

mod error;
#[cfg(test)]
mod memory;
mod models;
mod repo;

use crate::schema;

pub use error::{Error, Result};
#[cfg(test)]
pub use memory::MemoryQueueStore;
pub use models::Queue;
pub use repo::QueueRepository;

/// Result of [`QueueStore::get_or_create`].
#[derive(Debug, Clone)]
pub struct Fetched {
    pub created: bool,
    pub queue: Queue,
}

/// Storage for queue records, one per chat.
///
/// Implementations must serialize read-modify-write sequences run inside
/// [`QueueStore::atomically`] for the same chat.
pub trait QueueStore {
    /// Fails with [`Error::NotFound`] when the chat has no record yet.
    fn get(&self, chat_id: i64) -> Result<Queue>;

    fn create(&self, queue: Queue) -> Result<Queue>;

    fn save(&self, queue: &Queue) -> Result<()>;

    fn atomically<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>;

    fn get_or_create<F>(&self, chat_id: i64, init: F) -> Result<Fetched>
    where
        F: FnOnce() -> Queue,
    {
        match self.get(chat_id) {
            Ok(queue) => Ok(Fetched {
                created: false,
                queue,
            }),
            Err(Error::NotFound { .. }) => Ok(Fetched {
                created: true,
                queue: self.create(init())?,
            }),
            Err(e) => Err(e),
        }
    }
}
