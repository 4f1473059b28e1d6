//! Support module - listens, suggests coping techniques, records feedback.

pub mod analysis;
pub mod commands;
pub mod database;
pub mod engine;
pub mod replies;
pub mod techniques;
pub mod telegram;


pub use analysis::LexiconAnalyzer;
pub use commands::Command;
pub use database::Database;
pub use engine::{ConversationEngine, Input, Sessions};
pub use replies::ThreadRandom;
pub use telegram::TelegramClient;
