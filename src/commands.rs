use teloxide::{
    prelude::*,
    types::{ChatKind, MessageEntityKind, PublicChatKind},
    utils::command::BotCommand,
};

use crate::machine::{Action, Command, CommandContext, Mention};

#[derive(BotCommand, Debug, Clone, PartialEq)]
#[command(rename = "lowercase", description = "These commands are supported:")]
pub enum QueueCommand {
    #[command(description = "Obtain help.")]
    Help,
    #[command(description = "Obtain help.")]
    Info,
    #[command(description = "Obtain help.")]
    Information,
    #[command(description = "Obtain help.")]
    Start,
    #[command(rename = "help_ru", description = "Помощь на русском.")]
    HelpRu,
    #[command(description = "Show the queue.")]
    Queue,
    #[command(description = "Show the queue.")]
    Status,
    #[command(description = "List the admins of the queue.")]
    Admins,
    #[command(description = "Show who is first in the queue.")]
    Who,
    #[command(description = "Show your position in the queue.")]
    Where,
    #[command(description = "Enter the queue.")]
    Enter,
    #[command(description = "Leave the queue.")]
    Leave,
    #[command(description = "Add mentioned users to the queue. Syntax: /add @user...")]
    Add(String),
    #[command(description = "Remove mentioned users from the queue. Syntax: /remove @user...")]
    Remove(String),
    #[command(description = "Remove the first user from the queue.")]
    Pop,
    #[command(description = "Allow users to enter and leave by themselves.")]
    Activate,
    #[command(description = "Only admins may change the queue.")]
    Deactivate,
    #[command(description = "Make mentioned users admins. Syntax: /promote @user...")]
    Promote(String),
    #[command(description = "Take admin rights from mentioned users. Syntax: /demote @user...")]
    Demote(String),
    #[command(description = "Empty the queue.")]
    Reset,
    #[command(description = "Empty the queue.")]
    Restart,
    #[command(description = "Set the cooldown in seconds. Syntax: /cooldown seconds")]
    Cooldown(String),
}

impl From<QueueCommand> for Command {
    fn from(command: QueueCommand) -> Self {
        let action = match command {
            QueueCommand::Help
            | QueueCommand::Info
            | QueueCommand::Information
            | QueueCommand::Start => return Command::Help,
            QueueCommand::HelpRu => return Command::HelpRu,
            QueueCommand::Queue | QueueCommand::Status => Action::Status,
            QueueCommand::Admins => Action::Admins,
            QueueCommand::Who => Action::Who,
            QueueCommand::Where => Action::Where,
            QueueCommand::Enter => Action::Enter,
            QueueCommand::Leave => Action::Leave,
            QueueCommand::Add(_) => Action::Add,
            QueueCommand::Remove(_) => Action::Remove,
            QueueCommand::Pop => Action::Pop,
            QueueCommand::Activate => Action::Activate,
            QueueCommand::Deactivate => Action::Deactivate,
            QueueCommand::Promote(_) => Action::Promote,
            QueueCommand::Demote(_) => Action::Demote,
            QueueCommand::Reset | QueueCommand::Restart => Action::Reset,
            QueueCommand::Cooldown(raw) => Action::Cooldown(raw),
        };
        Command::Queue(action)
    }
}

pub fn context_of(message: &Message) -> CommandContext {
    let text = message.text().unwrap_or_default().to_string();
    let mentions = message
        .entities()
        .unwrap_or_default()
        .iter()
        .filter(|e| matches!(e.kind, MessageEntityKind::Mention))
        .map(|e| {
            let offset = char_index(&text, e.offset);
            Mention {
                offset,
                length: char_index(&text, e.offset + e.length) - offset,
            }
        })
        .collect();

    CommandContext {
        chat_id: message.chat.id,
        chat_name: message.chat.title().unwrap_or_default().to_string(),
        chat_type: chat_type(&message.chat.kind).to_string(),
        username: message
            .from()
            .and_then(|user| user.username.clone())
            .unwrap_or_default(),
        text,
        mentions,
    }
}

fn chat_type(kind: &ChatKind) -> &'static str {
    match kind {
        ChatKind::Private(_) => "private",
        ChatKind::Public(public) => match public.kind {
            PublicChatKind::Group(_) => "group",
            PublicChatKind::Supergroup(_) => "supergroup",
            PublicChatKind::Channel(_) => "channel",
        },
    }
}

/// Telegram counts entity offsets in UTF-16 code units.
fn char_index(text: &str, utf16_offset: usize) -> usize {
    let mut units = 0;
    for (i, c) in text.chars().enumerate() {
        if units >= utf16_offset {
            return i;
        }
        units += c.len_utf16();
    }
    text.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_aliases() {
        let parse = |text: &str| Command::from(QueueCommand::parse(text, "queue_bot").unwrap());

        assert_eq!(parse("/info"), Command::Help);
        assert_eq!(parse("/start"), Command::Help);
        assert_eq!(parse("/help_ru"), Command::HelpRu);
        assert_eq!(parse("/queue"), Command::Queue(Action::Status));
        assert_eq!(parse("/status@queue_bot"), Command::Queue(Action::Status));
        assert_eq!(parse("/restart"), Command::Queue(Action::Reset));
        assert_eq!(parse("/add @alice @bob"), Command::Queue(Action::Add));
        assert_eq!(
            parse("/cooldown 15"),
            Command::Queue(Action::Cooldown("15".to_string()))
        );
    }

    #[test]
    fn commands_are_case_sensitive() {
        assert!(QueueCommand::parse("/Enter", "queue_bot").is_err());
    }

    #[test]
    fn utf16_offsets_map_to_chars() {
        // "😀" is two UTF-16 units but one char.
        let text = "/add 😀 @ann";
        assert_eq!(char_index(text, 5), 5);
        assert_eq!(char_index(text, 8), 7);
        assert_eq!(char_index(text, 12), 11);
    }
}
