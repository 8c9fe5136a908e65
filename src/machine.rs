//! Queue state machine: authorization gates, membership changes and the
//! per-command pipelines built from them.

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::da::{self, Fetched, Queue, QueueStore};
use crate::format;

/// Expected refusals. The `Display` text is the reply sent to the chat.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    #[error("I work only in group chats.")]
    WrongChatType,
    #[error("Queue is deactivated. Only admins can add new people.")]
    QueueDeactivated,
    #[error("You must have admin permissions for this action.")]
    NotAdmin,
    #[error("You have to mention users for this action.")]
    NoMentionsProvided,
    #[error("There are no users in the queue.")]
    EmptyQueue,
    #[error("Please respect others, do not mention people too often. You have to wait for {cooldown} seconds between commands.")]
    CooldownActive { cooldown: i32, remaining: i64 },
    #[error("You have to provide an integer value.")]
    InvalidCooldownValue,
    #[error("You need a username to enter or leave the queue.")]
    NoUsername,
}

/// A mention span inside the message text, counted in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mention {
    pub offset: usize,
    pub length: usize,
}

/// Everything the transport knows about an incoming command.
#[derive(Debug, Clone, Default)]
pub struct CommandContext {
    pub chat_id: i64,
    pub chat_name: String,
    pub chat_type: String,
    /// Empty when the sender has no username.
    pub username: String,
    pub text: String,
    pub mentions: Vec<Mention>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    HelpRu,
    Queue(Action),
}

/// Commands that operate on the chat's queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Status,
    Admins,
    Who,
    Where,
    Enter,
    Leave,
    Add,
    Remove,
    Pop,
    Activate,
    Deactivate,
    Promote,
    Demote,
    Reset,
    Cooldown(String),
}

impl Action {
    /// Self-service commands respect the activation flag.
    fn bypasses_active_check(&self) -> bool {
        !matches!(self, Action::Enter | Action::Leave)
    }
}

/// What to do with the chat's status message once the reply is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusAction {
    Keep,
    Edit { message_id: i32, text: String },
    /// The reply itself is the new status message.
    Track,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub reply: String,
    pub status: StatusAction,
}

impl Response {
    fn reply(text: impl Into<String>) -> Self {
        Response {
            reply: text.into(),
            status: StatusAction::Keep,
        }
    }
}

#[derive(Debug)]
enum Abort {
    Refused(QueueError),
    Storage(da::Error),
}

impl From<QueueError> for Abort {
    fn from(e: QueueError) -> Self {
        Abort::Refused(e)
    }
}

impl From<da::Error> for Abort {
    fn from(e: da::Error) -> Self {
        Abort::Storage(e)
    }
}

pub struct QueueStateMachine<S> {
    store: S,
    owner: String,
}

impl<S: QueueStore> QueueStateMachine<S> {
    pub fn new(store: S, owner: impl Into<String>) -> Self {
        QueueStateMachine {
            store,
            owner: owner.into(),
        }
    }

    /// Runs one command inside a storage transaction. Refusals become the
    /// reply; only storage failures are returned as errors.
    pub fn handle(
        &self,
        ctx: &CommandContext,
        command: &Command,
        now: DateTime<Utc>,
    ) -> da::Result<Response> {
        let action = match command {
            Command::Help => return Ok(Response::reply(format::help_text(&self.owner))),
            Command::HelpRu => return Ok(Response::reply(format::help_text_ru(&self.owner))),
            Command::Queue(action) => action,
        };

        self.store
            .atomically(|| match self.execute(ctx, action, now) {
                Ok(response) => Ok(response),
                Err(Abort::Refused(e)) => {
                    log::info!("Chat: {}; Refused: {:?}", ctx.chat_id, e);
                    Ok(Response::reply(e.to_string()))
                }
                Err(Abort::Storage(e)) => Err(e),
            })
    }

    pub fn track_status_message(&self, chat_id: i64, message_id: i32) -> da::Result<()> {
        self.store.atomically(|| {
            let mut queue = self.store.get(chat_id)?;
            queue.message_id = message_id;
            self.store.save(&queue)
        })
    }

    fn execute(
        &self,
        ctx: &CommandContext,
        action: &Action,
        now: DateTime<Utc>,
    ) -> Result<Response, Abort> {
        require_group_chat(&ctx.chat_type)?;
        let loaded = self.resolve_queue(ctx, action.bypasses_active_check())?;

        let mut queue = loaded.clone();
        let result = apply(&mut queue, ctx, action, now);
        if queue != loaded {
            self.store.save(&queue)?;
        }
        let mut response = result?;

        if response.status == StatusAction::Keep && queue.message_id != 0 {
            let text = format::render_status(&queue);
            if text != format::render_status(&loaded) {
                response.status = StatusAction::Edit {
                    message_id: queue.message_id,
                    text,
                };
            }
        }
        Ok(response)
    }

    fn resolve_queue(
        &self,
        ctx: &CommandContext,
        bypass_active_check: bool,
    ) -> Result<Queue, Abort> {
        let Fetched { created, queue } = self.store.get_or_create(ctx.chat_id, || {
            let mut admins = vec![self.owner.clone()];
            if !ctx.username.is_empty() {
                admins.push(ctx.username.clone());
            }
            Queue::new(ctx.chat_id, ctx.chat_name.clone(), admins)
        })?;

        if created {
            log::info!("Chat: {}; Created queue \"{}\"", ctx.chat_id, queue.name);
        } else if !bypass_active_check && !queue.is_active && !queue.is_admin(&ctx.username) {
            return Err(QueueError::QueueDeactivated.into());
        }
        Ok(queue)
    }
}

fn apply(
    queue: &mut Queue,
    ctx: &CommandContext,
    action: &Action,
    now: DateTime<Utc>,
) -> Result<Response, QueueError> {
    let reply = match action {
        Action::Status => {
            require_cooldown_elapsed(now, queue.list_timestamp, queue.cooldown)?;
            require_non_empty(queue)?;
            queue.list_timestamp = now;
            return Ok(Response {
                reply: format::render_status(queue),
                status: StatusAction::Track,
            });
        }
        Action::Admins => {
            require_cooldown_elapsed(now, queue.admins_timestamp, queue.cooldown)?;
            queue.admins_timestamp = now;
            format::render_admins(queue)
        }
        Action::Who => {
            require_non_empty(queue)?;
            require_cooldown_elapsed(now, queue.who_timestamp, queue.cooldown)?;
            queue.who_timestamp = now;
            format!("{} is the first.", queue.users[0])
        }
        Action::Where => match queue.position_of(&ctx.username) {
            Some(pos) if !ctx.username.is_empty() => format!("Your position is {}", pos + 1),
            _ => "You are not in the queue.".to_string(),
        },
        Action::Enter => {
            let username = require_username(ctx)?;
            if queue.add_user(username) {
                format!(
                    "You are now in the queue! Your position is {}.",
                    queue.users.len()
                )
            } else {
                "You are already in the queue.".to_string()
            }
        }
        Action::Leave => {
            let username = require_username(ctx)?;
            if queue.remove_user(username) {
                "You have successfully left the queue".to_string()
            } else {
                "You are not in the queue.".to_string()
            }
        }
        Action::Add => {
            require_admin(queue, &ctx.username)?;
            let users = require_mentions(&ctx.text, &ctx.mentions)?;
            let not_added = users.iter().filter(|u| !queue.add_user(u)).count();
            if not_added == 0 {
                "Successfully added everybody mentioned.".to_string()
            } else if not_added == users.len() {
                "These users are already in the queue.".to_string()
            } else {
                format!(
                    "Some users [{}] have already been present in the queue. Added everyone else.",
                    not_added
                )
            }
        }
        Action::Remove => {
            require_admin(queue, &ctx.username)?;
            let users = require_mentions(&ctx.text, &ctx.mentions)?;
            let not_removed = users.iter().filter(|u| !queue.remove_user(u)).count();
            if not_removed == 0 {
                "Successfully removed everybody mentioned.".to_string()
            } else if not_removed == users.len() {
                "There are no such user(s) in the queue.".to_string()
            } else {
                format!(
                    "Some users [{}] have not been present in the queue. Removed everyone else.",
                    not_removed
                )
            }
        }
        Action::Pop => {
            require_admin(queue, &ctx.username)?;
            let username = queue.pop_front().ok_or(QueueError::EmptyQueue)?;
            format!("@{} is now not in the queue.", username)
        }
        Action::Activate => {
            require_admin(queue, &ctx.username)?;
            if queue.is_active {
                "Queue is already active.".to_string()
            } else {
                queue.is_active = true;
                "Successfully activated the queue.".to_string()
            }
        }
        Action::Deactivate => {
            require_admin(queue, &ctx.username)?;
            if !queue.is_active {
                "Queue is already deactivated.".to_string()
            } else {
                queue.is_active = false;
                "Successfully deactivated the queue.".to_string()
            }
        }
        Action::Promote => {
            require_admin(queue, &ctx.username)?;
            let users = require_mentions(&ctx.text, &ctx.mentions)?;
            let added = users.iter().filter(|u| queue.add_admin(u)).count();
            format!("Added {} new admins.", added)
        }
        Action::Demote => {
            require_admin(queue, &ctx.username)?;
            let users = require_mentions(&ctx.text, &ctx.mentions)?;
            let removed = users.iter().filter(|u| queue.remove_admin(u)).count();
            format!("Removed {} admins.", removed)
        }
        Action::Reset => {
            require_admin(queue, &ctx.username)?;
            queue.reset();
            "Queue reset.".to_string()
        }
        Action::Cooldown(raw) => {
            require_admin(queue, &ctx.username)?;
            set_cooldown(queue, raw)?;
            format!("Cooldown set to {}", queue.cooldown)
        }
    };
    Ok(Response::reply(reply))
}

pub fn require_group_chat(chat_type: &str) -> Result<(), QueueError> {
    if chat_type.to_lowercase().contains("group") {
        Ok(())
    } else {
        Err(QueueError::WrongChatType)
    }
}

pub fn require_admin(queue: &Queue, username: &str) -> Result<(), QueueError> {
    if queue.is_admin(username) {
        Ok(())
    } else {
        Err(QueueError::NotAdmin)
    }
}

/// Extracts mentioned usernames. The leading `@` is skipped only when the
/// character at the mention offset is `@`; otherwise the name is read from
/// the start of the text.
pub fn require_mentions(text: &str, mentions: &[Mention]) -> Result<Vec<String>, QueueError> {
    let chars: Vec<char> = text.chars().collect();
    let users: Vec<String> = mentions
        .iter()
        .map(|m| {
            let start = if chars.get(m.offset) == Some(&'@') {
                m.offset + 1
            } else {
                0
            };
            let end = (start + m.length)
                .min(m.offset + m.length)
                .min(chars.len());
            chars[start.min(end)..end].iter().collect()
        })
        .collect();

    if users.is_empty() {
        Err(QueueError::NoMentionsProvided)
    } else {
        Ok(users)
    }
}

pub fn require_non_empty(queue: &Queue) -> Result<(), QueueError> {
    if queue.users.is_empty() {
        Err(QueueError::EmptyQueue)
    } else {
        Ok(())
    }
}

pub fn require_cooldown_elapsed(
    now: DateTime<Utc>,
    last: DateTime<Utc>,
    cooldown: i32,
) -> Result<(), QueueError> {
    let wait = Duration::seconds(i64::from(cooldown));
    let elapsed = now.signed_duration_since(last);
    if elapsed < wait {
        let left_ms = (wait - elapsed).num_milliseconds();
        Err(QueueError::CooldownActive {
            cooldown,
            remaining: (left_ms + 999) / 1000,
        })
    } else {
        Ok(())
    }
}

fn require_username(ctx: &CommandContext) -> Result<&str, QueueError> {
    if ctx.username.is_empty() {
        Err(QueueError::NoUsername)
    } else {
        Ok(&ctx.username)
    }
}

/// Reads the first whitespace-delimited token as a non-negative number of
/// seconds. The queue is untouched on failure.
pub fn set_cooldown(queue: &mut Queue, raw: &str) -> Result<(), QueueError> {
    let value = raw
        .split_whitespace()
        .next()
        .and_then(|token| token.parse::<i32>().ok())
        .filter(|value| *value >= 0)
        .ok_or(QueueError::InvalidCooldownValue)?;
    queue.cooldown = value;
    Ok(())
}
