mod config;
mod support;

use std::sync::Arc;
use tokio::sync::Mutex;

use teloxide::prelude::*;
use tracing::{debug, info, warn};
use tracing_subscriber::prelude::*;

use config::Config;
use support::{
    Command, ConversationEngine, Database, Input, LexiconAnalyzer, Sessions, TelegramClient,
    ThreadRandom,
};

struct BotState {
    engine: ConversationEngine,
    telegram: TelegramClient,
    /// Active conversations keyed by Telegram user id.
    sessions: Mutex<Sessions>,
}

impl BotState {
    fn new(engine: ConversationEngine, bot: &Bot) -> Self {
        Self {
            engine,
            telegram: TelegramClient::new(bot.clone()),
            sessions: Mutex::new(Sessions::new()),
        }
    }

    /// Run one input through the engine and send the replies in order.
    async fn respond(&self, chat_id: ChatId, user_id: UserId, input: Input<'_>) {
        let user_id = user_id.0 as i64;
        let session = self.sessions.lock().await.remove(&user_id);

        // Other users keep going while this one's step (and any SQLite write) runs
        let (session, replies) =
            tokio::task::block_in_place(|| self.engine.step(session, user_id, input));

        if let Some(session) = session {
            self.sessions.lock().await.insert(user_id, session);
        }

        for reply in &replies {
            if self.telegram.send_reply(chat_id.0, reply).await.is_err() {
                break;
            }
        }
    }
}

#[tokio::main]
async fn main() {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "vza.json".to_string());
    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    // Setup logging
    let log_dir = config.log_dir();
    std::fs::create_dir_all(&log_dir).ok();
    let log_file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join(&config.log_file))
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Failed to open log file: {e}");
            std::process::exit(1);
        }
    };
    let (non_blocking, _guard) = tracing_appender::non_blocking(log_file);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .init();

    info!("🚀 Starting vza...");
    info!("Loaded config from {config_path}");

    let database = match Database::open(config.database_path()) {
        Ok(db) => db,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };
    let engine = ConversationEngine::new(
        Arc::new(LexiconAnalyzer::new()),
        Arc::new(ThreadRandom),
        database,
    );
    match engine.database().count() {
        Ok(n) => info!("Loaded database from {:?} ({} responses)", engine.database().path(), n),
        Err(e) => warn!("Failed to count responses: {e}"),
    }

    let bot = Bot::new(&config.telegram_bot_token);
    let state = Arc::new(BotState::new(engine, &bot));
    if let Err(e) = state.telegram.register_commands().await {
        warn!("{e}");
    }

    let handler = Update::filter_message()
        .branch(dptree::entry().filter_command::<Command>().endpoint(handle_command))
        .branch(dptree::endpoint(handle_text));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

async fn handle_command(msg: Message, cmd: Command, state: Arc<BotState>) -> ResponseResult<()> {
    let Some(ref user) = msg.from else {
        return Ok(());
    };

    let username = user.username.as_deref().unwrap_or(&user.first_name);
    info!("📨 {:?} from {} ({})", cmd, username, user.id);

    state.respond(msg.chat.id, user.id, cmd.into()).await;
    Ok(())
}

async fn handle_text(msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let Some(ref user) = msg.from else {
        return Ok(());
    };
    let Some(text) = msg.text() else {
        return Ok(());
    };

    // Unknown commands are not conversation text
    if text.starts_with('/') {
        debug!("Ignoring unknown command from {}: {}", user.id, text);
        return Ok(());
    }

    let text_preview: String = text.chars().take(100).collect();
    debug!("Message from {}: \"{text_preview}\"", user.id);

    state.respond(msg.chat.id, user.id, Input::Text(text)).await;
    Ok(())
}
