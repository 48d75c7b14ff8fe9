use std::env;
use std::sync::Arc;

use anyhow::Result;
use teloxide::prelude::*;
use tracing::{info, warn};

use bakecheck::bot as bot_handlers;
use bakecheck::catalog;
use bakecheck::controller::Controller;
use bakecheck::reference_store::ReferenceStore;
use bakecheck::session::SessionStore;
use bakecheck::vision::OpenAiVision;

fn catalog_brands() -> Vec<String> {
    catalog::brands().iter().map(|s| s.to_string()).collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    info!("Starting Bakecheck Telegram Bot");

    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let bot_token = env::var("TELEGRAM_BOT_TOKEN").expect("TELEGRAM_BOT_TOKEN must be set");
    let openai_api_key = env::var("OPENAI_API_KEY").expect("OPENAI_API_KEY must be set");
    let openai_model = env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

    let reference = match env::var("REFERENCE_FILE") {
        Ok(path) => {
            info!(path = %path, "Seeding reference store from file");
            match std::fs::read_to_string(&path) {
                Ok(text) => ReferenceStore::with_text(catalog_brands(), &text),
                Err(e) => {
                    warn!(path = %path, error = %e, "Failed to read reference file, starting empty");
                    ReferenceStore::new(catalog_brands())
                }
            }
        }
        Err(_) => ReferenceStore::new(catalog_brands()),
    };

    let analyzer = Arc::new(OpenAiVision::new(openai_api_key, openai_model));
    let controller = Arc::new(Controller::new(
        SessionStore::new(),
        Arc::new(reference),
        analyzer,
    ));

    let bot = Bot::new(bot_token);

    info!("Bot initialized, starting dispatcher");

    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint({
            let controller = Arc::clone(&controller);
            move |bot: Bot, msg: Message| {
                let controller = Arc::clone(&controller);
                async move { bot_handlers::message_handler(bot, msg, controller).await }
            }
        }))
        .branch(Update::filter_callback_query().endpoint({
            let controller = Arc::clone(&controller);
            move |bot: Bot, q: CallbackQuery| {
                let controller = Arc::clone(&controller);
                async move { bot_handlers::callback_handler(bot, q, controller).await }
            }
        }));

    Dispatcher::builder(bot, handler)
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
