//! Telegram client using teloxide.

use teloxide::prelude::*;
use teloxide::types::{KeyboardButton, KeyboardMarkup, ReplyMarkup};
use teloxide::utils::command::BotCommands;
use tracing::{info, warn};

use crate::support::commands::Command;
use crate::support::engine::{Keyboard, Reply};

/// Telegram API client.
pub struct TelegramClient {
    bot: Bot,
}

impl TelegramClient {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    /// Send one engine reply as plain text.
    pub async fn send_reply(&self, chat_id: i64, reply: &Reply) -> Result<i64, String> {
        let mut request = self.bot.send_message(ChatId(chat_id), &reply.text);
        if let Some(markup) = reply_markup(reply.keyboard) {
            request = request.reply_markup(markup);
        }

        request.await.map(|msg| msg.id.0 as i64).map_err(|e| {
            let msg = format!("Failed to send: {e}");
            warn!("{}", msg);
            msg
        })
    }

    /// Register the command list shown by Telegram clients.
    pub async fn register_commands(&self) -> Result<(), String> {
        self.bot
            .set_my_commands(Command::bot_commands())
            .await
            .map_err(|e| format!("Failed to set commands: {e}"))?;
        info!("Registered bot commands");
        Ok(())
    }
}

fn reply_markup(keyboard: Keyboard) -> Option<ReplyMarkup> {
    match keyboard {
        Keyboard::Unchanged => None,
        Keyboard::YesNo => Some(ReplyMarkup::Keyboard(
            KeyboardMarkup::new(vec![vec![KeyboardButton::new("yes"), KeyboardButton::new("no")]])
                .resize_keyboard()
                .one_time_keyboard(),
        )),
        Keyboard::Remove => Some(ReplyMarkup::kb_remove()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unchanged_has_no_markup() {
        assert!(reply_markup(Keyboard::Unchanged).is_none());
    }

    #[test]
    fn test_yes_no_keyboard() {
        let Some(ReplyMarkup::Keyboard(markup)) = reply_markup(Keyboard::YesNo) else {
            panic!("expected a reply keyboard");
        };
        let labels: Vec<&str> = markup.keyboard[0].iter().map(|b| b.text.as_str()).collect();
        assert_eq!(labels, vec!["yes", "no"]);
        assert!(markup.one_time_keyboard);
    }

    #[test]
    fn test_remove_keyboard() {
        assert!(matches!(reply_markup(Keyboard::Remove), Some(ReplyMarkup::KeyboardRemove(_))));
    }
}
