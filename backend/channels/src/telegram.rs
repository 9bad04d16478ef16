use std::sync::Arc;

use crate::ChannelAdapter;
use crate::conversation::{BotState, Inbound, PhotoRef, Reply};
use crate::telegram_media::{TelegramMedia, largest_photo};
use async_trait::async_trait;
use snaptext_core::Language;
use snaptext_dialogs::Dialogs;
use teloxide::payloads::SendMessageSetters;
use teloxide::prelude::*;
use teloxide::types::{KeyboardButton, KeyboardMarkup, MessageId, ReplyParameters};
use tracing::{error, info, warn};

/// Telegram's per-message text limit, in characters.
pub const MAX_MESSAGE_CHARS: usize = 4096;

/// Buttons per keyboard row.
const KEYBOARD_COLUMNS: usize = 2;

pub struct TelegramAdapter {
    bot: Bot,
    state: Arc<BotState>,
}

impl TelegramAdapter {
    pub fn new(token: String, state: Arc<BotState>) -> Self {
        Self {
            bot: Bot::new(token),
            state,
        }
    }
}

#[async_trait]
impl ChannelAdapter for TelegramAdapter {
    fn name(&self) -> &str { "telegram" }

    async fn start(&self) -> anyhow::Result<()> {
        let me = self.bot.get_me().await?;
        info!(username = %me.username(), "Starting Telegram adapter");

        let handler = Update::filter_message().endpoint(
            |bot: Bot, msg: Message, state: Arc<BotState>| async move {
                handle_message(&bot, &msg, &state).await;
                respond(())
            },
        );

        info!("Long poll started");
        Dispatcher::builder(self.bot.clone(), handler)
            .dependencies(dptree::deps![self.state.clone()])
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        info!("Telegram adapter stopped");
        Ok(())
    }
}

/// Classify a Telegram message for the conversation layer.
fn inbound_from(msg: &Message) -> Inbound {
    if let Some(sizes) = msg.photo() {
        if let Some(photo) = largest_photo(sizes) {
            return Inbound::Photo(PhotoRef {
                file_id: photo.file.id.to_string(),
                submitted_at: msg.date.timestamp(),
            });
        }
    }
    match msg.text() {
        Some(text) => Inbound::Text(text.to_string()),
        None => Inbound::Other,
    }
}

async fn handle_message(bot: &Bot, msg: &Message, state: &BotState) {
    let user_id = msg.chat.id.0;
    let media = TelegramMedia::new(bot.clone());
    let replies = state.handle(user_id, inbound_from(msg), &media).await;

    for reply in replies {
        deliver(bot, msg.chat.id, msg.id, &reply, &state.dialogs).await;
    }
}

async fn deliver(bot: &Bot, chat_id: ChatId, source: MessageId, reply: &Reply, dialogs: &Dialogs) {
    let keyboard = reply.language_keyboard.then(|| language_keyboard(dialogs));
    let reply_to = reply.reply_to_source.then_some(source);
    for chunk in split_message(&reply.text, MAX_MESSAGE_CHARS) {
        send_message(bot, chat_id, &chunk, reply_to, keyboard.clone()).await;
    }
}

/// Send a message, retrying once without the reply reference if the first
/// attempt fails (the source message may have been deleted). Failures are logged.
pub async fn send_message(
    bot: &Bot,
    chat_id: ChatId,
    text: &str,
    reply_to: Option<MessageId>,
    keyboard: Option<KeyboardMarkup>,
) {
    let build = |reply_to: Option<MessageId>| {
        let mut req = bot.send_message(chat_id, text);
        if let Some(id) = reply_to {
            req = req.reply_parameters(ReplyParameters::new(id));
        }
        if let Some(kb) = keyboard.clone() {
            req = req.reply_markup(kb);
        }
        req
    };

    match build(reply_to).await {
        Ok(_) => {}
        Err(e) if reply_to.is_some() => {
            warn!(chat_id = chat_id.0, error = %e, "Reply failed; sending without reply reference");
            if let Err(e) = build(None).await {
                error!(chat_id = chat_id.0, error = %e, "Failed to send message");
            }
        }
        Err(e) => error!(chat_id = chat_id.0, error = %e, "Failed to send message"),
    }
}

/// One-time reply keyboard with a `/lang <code>` button per supported language.
pub fn language_keyboard(dialogs: &Dialogs) -> KeyboardMarkup {
    let buttons: Vec<KeyboardButton> = Language::ALL
        .iter()
        .map(|&l| KeyboardButton::new(language_button_text(dialogs, l)))
        .collect();
    let rows: Vec<Vec<KeyboardButton>> = buttons
        .chunks(KEYBOARD_COLUMNS)
        .map(|row| row.to_vec())
        .collect();
    KeyboardMarkup::new(rows).resize_keyboard().one_time_keyboard()
}

/// `"/lang <code>\n\n<label in that language>"`
pub fn language_button_text(dialogs: &Dialogs, language: Language) -> String {
    format!("/lang {}\n\n{}", language.code(), dialogs.language_button(language))
}

/// Split `text` into pieces of at most `max_chars` characters, preferring line
/// breaks. Always yields at least one piece.
pub fn split_message(text: &str, max_chars: usize) -> Vec<String> {
    if text.chars().count() <= max_chars {
        return vec![text.to_string()];
    }
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;
    for line in text.split_inclusive('\n') {
        for ch in line.chars() {
            if current_len == max_chars {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            current.push(ch);
            current_len += 1;
        }
        // Start a new chunk at a line boundary if the next line may not fit.
        if current_len > max_chars / 2 && current.ends_with('\n') {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
