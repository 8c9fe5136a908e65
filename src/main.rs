mod commands;
mod config;
mod consts;
mod da;
mod error;
mod format;
mod machine;
mod schema;

#[macro_use]
extern crate diesel;

use std::{net::Ipv4Addr, sync::Arc};

use chrono::Utc;
use commands::QueueCommand;
use config::Config;
use diesel::{Connection, PgConnection};
use futures::Future;
use machine::{Command, QueueStateMachine, StatusAction};
use teloxide::prelude::*;
use warp::Filter;

#[tokio::main]
async fn main() {
    teloxide::enable_logging!();

    if let Err(e) = run().await {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> error::Result<()> {
    let config = Arc::new(Config::from_env()?);

    log::info!("Connecting to the database...");
    let conn = establish_connection(&config.database_url)?;

    log::info!("Running migrations...");
    diesel_migrations::run_pending_migrations(&conn)?;
    drop(conn);

    log::info!("Starting the bot...");
    let repl = create_bot(config.clone());
    let serve = create_http_server(config.handler_port);

    tokio::join!(repl, serve);
    Ok(())
}

async fn answer(
    cx: UpdateWithCx<Bot, Message>,
    command: QueueCommand,
    config: Arc<Config>,
) -> error::Result<()> {
    let ctx = commands::context_of(&cx.update);
    let command = Command::from(command);

    log::info!("Chat: {}; Command: {:?}", ctx.chat_id, command);

    let response = state_machine(&config)?.handle(&ctx, &command, Utc::now())?;

    let Message { id: sent_id, .. } = cx.reply_to(response.reply).send().await?;

    match response.status {
        StatusAction::Keep => {}
        StatusAction::Edit { message_id, text } => {
            if let Err(e) = cx
                .requester
                .edit_message_text(ctx.chat_id, message_id, text)
                .send()
                .await
            {
                log::warn!(
                    "Chat: {}; Could not update status message {}: {}",
                    ctx.chat_id,
                    message_id,
                    e
                );
            }
        }
        StatusAction::Track => {
            state_machine(&config)?.track_status_message(ctx.chat_id, sent_id)?
        }
    }

    Ok(())
}

fn create_bot(config: Arc<Config>) -> impl Future {
    let bot = Bot::from_env();
    let bot_name = config.bot_name.clone();

    teloxide::commands_repl(bot, bot_name, move |cx, command| {
        answer(cx, command, config.clone())
    })
}

fn state_machine(config: &Config) -> error::Result<QueueStateMachine<da::QueueRepository>> {
    let conn = establish_connection(&config.database_url)?;
    Ok(QueueStateMachine::new(
        da::QueueRepository::from_connection(conn),
        config.owner.as_str(),
    ))
}

fn establish_connection(database_url: &str) -> error::Result<PgConnection> {
    Ok(PgConnection::establish(database_url)?)
}

fn create_http_server(port: u16) -> impl Future {
    let alive = warp::get()
        .and(warp::path::end())
        .map(|| "Queue bot is running.");

    warp::serve(alive).run((Ipv4Addr::UNSPECIFIED, port))
}
