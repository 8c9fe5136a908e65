use thiserror::Error;

use crate::da;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] da::Error),
    #[error("Database connection error")]
    Connection(#[from] diesel::ConnectionError),
    #[error("Migration error")]
    Migration(#[from] diesel_migrations::RunMigrationsError),
    #[error("Telegram request error")]
    Telegram(#[from] teloxide::RequestError),
    #[error("You must provide the {name} env variable")]
    MissingEnv { name: &'static str },
    #[error("The {name} env variable is invalid: {value}")]
    InvalidEnv { name: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, Error>;
