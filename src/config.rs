use std::env;

use crate::consts;
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub bot_name: String,
    pub database_url: String,
    pub handler_port: u16,
    /// Admin of every queue the bot creates.
    pub owner: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| lookup(name).ok_or(Error::MissingEnv { name });

        // Read by `Bot::from_env`, checked here so start-up fails with a clear error.
        required(consts::TOKEN)?;

        let handler_port = match lookup(consts::HANDLER_PORT) {
            Some(value) => value.parse().map_err(|_| Error::InvalidEnv {
                name: consts::HANDLER_PORT,
                value,
            })?,
            None => consts::DEFAULT_HANDLER_PORT,
        };

        Ok(Config {
            bot_name: required(consts::BOT_NAME)?,
            database_url: required(consts::DATABASE_URL)?,
            handler_port,
            owner: lookup(consts::QUEUE_OWNER)
                .unwrap_or_else(|| consts::DEFAULT_OWNER.to_string()),
        })
    }
}
