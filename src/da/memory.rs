use std::collections::HashMap;
use std::sync::Mutex;

use super::error::{Error, Result};
use super::models::Queue;
use super::QueueStore;

/// In-process store used by the state machine tests.
#[derive(Default)]
pub struct MemoryQueueStore {
    queues: Mutex<HashMap<i64, Queue>>,
    /// Held for the whole of `atomically`, so transactions run one at a time.
    transaction: Mutex<()>,
}

impl MemoryQueueStore {
    pub fn len(&self) -> usize {
        self.queues.lock().unwrap().len()
    }

    pub fn insert(&self, queue: Queue) {
        self.queues.lock().unwrap().insert(queue.chat_id, queue);
    }
}

impl QueueStore for MemoryQueueStore {
    fn get(&self, chat_id: i64) -> Result<Queue> {
        self.queues
            .lock()
            .unwrap()
            .get(&chat_id)
            .cloned()
            .ok_or(Error::NotFound { chat_id })
    }

    fn create(&self, queue: Queue) -> Result<Queue> {
        Ok(self
            .queues
            .lock()
            .unwrap()
            .entry(queue.chat_id)
            .or_insert(queue)
            .clone())
    }

    fn save(&self, queue: &Queue) -> Result<()> {
        match self.queues.lock().unwrap().get_mut(&queue.chat_id) {
            Some(stored) => {
                *stored = queue.clone();
                Ok(())
            }
            None => Err(Error::NotFound {
                chat_id: queue.chat_id,
            }),
        }
    }

    fn atomically<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let _guard = self.transaction.lock().unwrap();
        f()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn queue(chat_id: i64) -> Queue {
        Queue::new(chat_id, "chat", vec!["owner".to_string()])
    }

    #[test]
    fn get_missing_is_not_found() {
        let store = MemoryQueueStore::default();
        assert!(matches!(
            store.get(7),
            Err(Error::NotFound { chat_id: 7 })
        ));
    }

    #[test]
    fn get_or_create_creates_once() {
        let store = MemoryQueueStore::default();

        let first = store.get_or_create(7, || queue(7)).unwrap();
        assert!(first.created);

        let second = store
            .get_or_create(7, || panic!("must not create twice"))
            .unwrap();
        assert!(!second.created);
        assert_eq!(first.queue, second.queue);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn transactions_do_not_lose_updates() {
        let store = Arc::new(MemoryQueueStore::default());
        store.insert(queue(5));

        let workers: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    store
                        .atomically(|| {
                            let mut q = store.get(5)?;
                            thread::yield_now();
                            q.add_user(&format!("user{}", i));
                            store.save(&q)
                        })
                        .unwrap();
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        assert_eq!(store.get(5).unwrap().users.len(), 8);
    }

    #[test]
    fn save_requires_existing_record() {
        let store = MemoryQueueStore::default();
        assert!(store.save(&queue(3)).is_err());

        store.insert(queue(3));
        let mut q = store.get(3).unwrap();
        q.add_user("alice");
        store.save(&q).unwrap();
        assert_eq!(store.get(3).unwrap().users, vec!["alice"]);
    }
}
