use async_trait::async_trait;

pub mod conversation;
pub mod telegram;
pub mod telegram_commands;
pub mod telegram_media;

pub use conversation::{BotState, FetchedPhoto, Inbound, PhotoFetcher, PhotoRef, Reply};
pub use telegram::TelegramAdapter;
pub use telegram_commands::{parse_command, BotCommand};

/// Transport adapters implement this trait.
#[async_trait]
pub trait ChannelAdapter: Send + Sync {
    /// Human-readable adapter name for logging.
    fn name(&self) -> &str;

    /// Run the adapter's receive loop until shutdown.
    async fn start(&self) -> anyhow::Result<()>;
}
