use common::models::Notification;
use teloxide::prelude::*;
use tokio::sync::broadcast;
use tracing::{error, info};

use crate::config::TelegramConfig;

enum Sink {
    Telegram { bot: Bot, chat_id: ChatId },
    Log,
}

/// Delivers notifications best-effort. Failed deliveries are logged and
/// dropped.
pub struct NotificationService {
    sink: Sink,
}

impl NotificationService {
    pub fn telegram(config: &TelegramConfig) -> Self {
        Self {
            sink: Sink::Telegram {
                bot: Bot::new(config.token.clone()),
                chat_id: ChatId(config.chat_id),
            },
        }
    }

    pub fn log_only() -> Self {
        Self { sink: Sink::Log }
    }

    pub async fn start(self, mut rx: broadcast::Receiver<Notification>) {
        match self.sink {
            Sink::Telegram { .. } => info!("Starting Telegram Notification Service"),
            Sink::Log => info!("Telegram not configured, notifications go to the log"),
        }

        loop {
            match rx.recv().await {
                Ok(event) => self.deliver(&event).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    error!("Notification service lagged behind. Missed {} messages.", n);
                }
                Err(_) => {
                    info!("Notification channel closed. Stopping service.");
                    break;
                }
            }
        }
    }

    async fn deliver(&self, event: &Notification) {
        let text = event.to_string();
        match &self.sink {
            Sink::Telegram { bot, chat_id } => {
                if let Err(e) = bot.send_message(*chat_id, text).await {
                    error!("Failed to send Telegram message: {}", e);
                }
            }
            Sink::Log => info!("NOTIFY {}", text.replace('\n', " | ")),
        }
    }
}
