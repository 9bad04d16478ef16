//! Telegram Bot Commands
//!
//! Parses `/start`, `/help`, `/info`, `/lang [code]` and `/history` from message text.

/// Commands the bot answers to.
pub const COMMANDS: &[&str] = &["/start", "/help", "/info", "/lang", "/history"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    Start,
    Help,
    Info,
    History,
    /// `/lang` with the raw argument, if any.
    Lang(Option<String>),
    Unknown(String),
}

/// Parse a command from the start of `text`. Returns `None` for non-command text.
///
/// Accepts the `/cmd@botname` form Telegram uses in group chats.
pub fn parse_command(text: &str) -> Option<BotCommand> {
    let text = text.trim_start();
    if !text.starts_with('/') {
        return None;
    }
    let mut parts = text.split_whitespace();
    let head = parts.next()?;
    let name = head.split('@').next().unwrap_or(head).to_ascii_lowercase();

    let command = match name.as_str() {
        "/start" => BotCommand::Start,
        "/help" => BotCommand::Help,
        "/info" => BotCommand::Info,
        "/history" => BotCommand::History,
        "/lang" => BotCommand::Lang(parts.next().map(str::to_string)),
        _ => BotCommand::Unknown(name),
    };
    Some(command)
}

/// Whether `text` mentions a known command anywhere. Such messages are ignored
/// rather than answered with the no-photo error.
pub fn mentions_command(text: &str) -> bool {
    COMMANDS.iter().any(|c| text.contains(c))
}
