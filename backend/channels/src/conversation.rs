//! Reply logic for one inbound event.
//!
//! Resolves the sender's ledger, decides what to answer and returns the replies
//! without touching the network, so the adapter only has to deliver them.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use async_trait::async_trait;
use chrono::DateTime;
use snaptext_core::{Language, Record, UserId, UserRegistry};
use snaptext_dialogs::Dialogs;
use snaptext_logging::{BotEvent, EventLogger};
use snaptext_understanding::OcrEngine;
use tracing::{debug, info, warn};

use crate::telegram_commands::{mentions_command, parse_command, BotCommand};

/// Telegram rejects empty messages; sent when OCR finds no text.
pub const EMPTY_RESULT_PLACEHOLDER: &str = "…";

/// What arrived from the user.
#[derive(Debug, Clone)]
pub enum Inbound {
    Text(String),
    Photo(PhotoRef),
    /// Anything else (stickers, documents, ...).
    Other,
}

/// The largest size of a received photo.
#[derive(Debug, Clone)]
pub struct PhotoRef {
    pub file_id: String,
    /// Message date, UTC seconds.
    pub submitted_at: i64,
}

/// Downloaded photo contents.
#[derive(Debug, Clone)]
pub struct FetchedPhoto {
    pub path: String,
    pub bytes: Vec<u8>,
}

/// Resolves a file id to its transport path and downloads it.
#[async_trait]
pub trait PhotoFetcher: Send + Sync {
    async fn fetch(&self, file_id: &str) -> Result<FetchedPhoto>;
}

/// One outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    /// Send as a reply to the inbound message.
    pub reply_to_source: bool,
    /// Attach the language selection keyboard.
    pub language_keyboard: bool,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: text.into(), reply_to_source: false, language_keyboard: false }
    }

    fn as_reply(mut self) -> Self {
        self.reply_to_source = true;
        self
    }

    fn with_keyboard(mut self) -> Self {
        self.language_keyboard = true;
        self
    }
}

/// Shared state handed to every update handler.
pub struct BotState {
    pub registry: UserRegistry,
    pub dialogs: Dialogs,
    pub ocr: Arc<dyn OcrEngine>,
}

impl BotState {
    pub fn new(registry: UserRegistry, dialogs: Dialogs, ocr: Arc<dyn OcrEngine>) -> Self {
        Self { registry, dialogs, ocr }
    }

    /// Decide the replies for one inbound event from `user_id`.
    pub async fn handle(&self, user_id: UserId, inbound: Inbound, fetcher: &dyn PhotoFetcher) -> Vec<Reply> {
        match inbound {
            Inbound::Text(text) => match parse_command(&text) {
                Some(command) => self.handle_command(user_id, command).await,
                None if mentions_command(&text) => Vec::new(),
                None => self.no_photo(user_id).await,
            },
            Inbound::Photo(photo) => self.handle_photo(user_id, photo, fetcher).await,
            Inbound::Other => self.no_photo(user_id).await,
        }
    }

    async fn language_of(&self, user_id: UserId) -> Language {
        self.registry.resolve(user_id).await.lock().await.language()
    }

    async fn no_photo(&self, user_id: UserId) -> Vec<Reply> {
        let language = self.language_of(user_id).await;
        vec![Reply::text(self.dialogs.error_no_photo(language))]
    }

    pub async fn handle_command(&self, user_id: UserId, command: BotCommand) -> Vec<Reply> {
        let language = self.language_of(user_id).await;
        let d = &self.dialogs;
        match command {
            BotCommand::Start => vec![
                Reply::text(d.greeting(language)),
                self.language_prompt(language),
            ],
            BotCommand::Help => vec![Reply::text(d.help(language))],
            BotCommand::Info => vec![Reply::text(d.info(language)), Reply::text(d.hint(language))],
            BotCommand::Lang(arg) => self.change_language(user_id, language, arg).await,
            BotCommand::History => self.history(user_id, language).await,
            BotCommand::Unknown(name) => {
                debug!(user_id, command = %name, "Ignoring unknown command");
                Vec::new()
            }
        }
    }

    fn language_prompt(&self, language: Language) -> Reply {
        Reply::text(self.dialogs.select_language(language)).with_keyboard()
    }

    async fn change_language(&self, user_id: UserId, current: Language, arg: Option<String>) -> Vec<Reply> {
        let Some(code) = arg else {
            return vec![self.language_prompt(current)];
        };
        let Ok(language) = code.parse::<Language>() else {
            debug!(user_id, code = %code, "Unsupported language requested");
            return vec![self.language_prompt(current)];
        };

        self.registry.resolve(user_id).await.lock().await.set_language(language);
        EventLogger::log_event(user_id, BotEvent::LanguageChanged { language: language.to_string() });
        vec![
            Reply::text(self.dialogs.info(language)),
            Reply::text(self.dialogs.hint(language)),
        ]
    }

    async fn history(&self, user_id: UserId, language: Language) -> Vec<Reply> {
        let records = self.registry.resolve(user_id).await.lock().await.records();
        if records.is_empty() {
            return vec![Reply::text(self.dialogs.error_empty_history(language))];
        }
        EventLogger::log_event(user_id, BotEvent::HistoryServed { count: records.len() });
        records.iter().map(|r| Reply::text(format_history_entry(r))).collect()
    }

    pub async fn handle_photo(&self, user_id: UserId, photo: PhotoRef, fetcher: &dyn PhotoFetcher) -> Vec<Reply> {
        let started = Instant::now();
        let ledger = self.registry.resolve(user_id).await;
        let (language, limited, retained) = {
            let guard = ledger.lock().await;
            (guard.language(), guard.is_rate_limited(), guard.count_records())
        };

        if limited {
            EventLogger::log_event(user_id, BotEvent::RateLimited { retained });
            return vec![Reply::text(self.dialogs.error_too_many_photos(language))];
        }

        let engine = self.ocr.name().to_string();
        let recognized = async {
            let fetched = fetcher.fetch(&photo.file_id).await?;
            let text = self.ocr.recognize(&fetched.bytes).await?;
            Ok::<_, anyhow::Error>((fetched.path, text))
        }
        .await;

        let (path, text) = match recognized {
            Ok(ok) => ok,
            Err(e) => {
                warn!(user_id, file_id = %photo.file_id, error = %e, "Photo recognition failed");
                EventLogger::log_event(user_id, BotEvent::OcrFailed { engine, error_msg: format!("{e:#}") });
                return vec![Reply::text(self.dialogs.error_ocr_failed(language))];
            }
        };

        ledger
            .lock()
            .await
            .add_record(text.clone(), photo.file_id.clone(), path, photo.submitted_at);

        let elapsed_ms = started.elapsed().as_millis() as u64;
        info!(user_id, elapsed_ms, chars = text.chars().count(), "Photo recognized");
        EventLogger::log_event(
            user_id,
            BotEvent::PhotoRecognized { engine, chars: text.chars().count(), elapsed_ms },
        );

        let body = if text.is_empty() { EMPTY_RESULT_PLACEHOLDER.to_string() } else { text };
        vec![Reply::text(body).as_reply(), Reply::text(self.dialogs.hint(language))]
    }
}

/// `"%Y-%m-%d %I:%M:%S %p GMT+0\n\n<result>"`, stamped with the submission time.
pub fn format_history_entry(record: &Record) -> String {
    let stamp = DateTime::from_timestamp(record.submitted_at(), 0)
        .map(|t| t.format("%Y-%m-%d %I:%M:%S %p").to_string())
        .unwrap_or_else(|| record.submitted_at().to_string());
    format!("{stamp} GMT+0\n\n{}", record.result())
}
