use diesel::{prelude::*, PgConnection, QueryDsl};

use super::error::{Error, Result};
use super::models::Queue;
use super::schema;
use super::QueueStore;

pub struct QueueRepository {
    conn: PgConnection,
}

impl QueueRepository {
    pub fn from_connection(conn: PgConnection) -> Self {
        QueueRepository { conn }
    }
}

impl QueueStore for QueueRepository {
    fn get(&self, id: i64) -> Result<Queue> {
        use schema::queues::dsl::*;

        match queues.find(id).for_update().first::<Queue>(&self.conn) {
            Ok(queue) => Ok(queue),
            Err(diesel::NotFound) => Err(Error::NotFound { chat_id: id }),
            Err(e) => Err(e.into()),
        }
    }

    fn create(&self, queue: Queue) -> Result<Queue> {
        use schema::queues::dsl::queues;

        // A concurrent first command may have inserted the row already; the
        // stored one wins.
        diesel::insert_into(queues)
            .values(&queue)
            .on_conflict_do_nothing()
            .execute(&self.conn)?;
        self.get(queue.chat_id)
    }

    fn save(&self, queue: &Queue) -> Result<()> {
        diesel::update(queue).set(queue).execute(&self.conn)?;
        Ok(())
    }

    fn atomically<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        self.conn.transaction(f)
    }
}
