use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error")]
    Diesel(#[from] diesel::result::Error),
    #[error("No queue for chat {chat_id}.")]
    NotFound { chat_id: i64 },
}

pub type Result<T> = std::result::Result<T, Error>;
