//! Telegram Media Handler
//!
//! Picks the photo size to recognize and downloads it from Telegram's file storage.

use anyhow::{Context, Result};
use async_trait::async_trait;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::PhotoSize;
use tracing::debug;

use crate::conversation::{FetchedPhoto, PhotoFetcher};

/// Telegram lists photo sizes smallest first; the last one is the original.
pub fn largest_photo(sizes: &[PhotoSize]) -> Option<&PhotoSize> {
    sizes.iter().max_by_key(|p| p.width * p.height)
}

/// Downloads photos through the bot's file API.
pub struct TelegramMedia {
    bot: Bot,
}

impl TelegramMedia {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl PhotoFetcher for TelegramMedia {
    async fn fetch(&self, file_id: &str) -> Result<FetchedPhoto> {
        let file = self
            .bot
            .get_file(file_id.to_string())
            .await
            .with_context(|| format!("getFile failed for {file_id}"))?;

        let mut bytes = Vec::with_capacity(file.meta.size as usize);
        self.bot
            .download_file(&file.path, &mut bytes)
            .await
            .with_context(|| format!("Download failed for {}", file.path))?;

        debug!(file_id, path = %file.path, bytes = bytes.len(), "Downloaded Telegram photo");
        Ok(FetchedPhoto { path: file.path, bytes })
    }
}
