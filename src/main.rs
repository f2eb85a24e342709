mod commands;
mod config;
mod errors;
mod handlers;
mod queue;
mod relay;
mod schema;
mod transport;
mod utils;
mod video;

use std::sync::Arc;

use teloxide::{prelude::*, utils::command::BotCommands};

use crate::{
    config::Config,
    queue::DownloadQueue,
    schema::{Command, schema},
    utils::clear_dir,
    video::YtDlp,
};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    pretty_env_logger::init();
    log::info!("Starting video relay bot...");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };

    // Uploads of up to 50MB need far more than the default client timeout
    let client = match teloxide::net::default_reqwest_settings()
        .timeout(config.request_timeout)
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            log::error!("Failed to build HTTP client: {}", e);
            std::process::exit(1);
        }
    };
    let bot = Bot::with_client(&config.token, client);

    if let Err(e) = clear_dir(&config.downloads_dir).await {
        log::warn!("Failed to clear {}: {}", config.downloads_dir.display(), e);
    }

    match bot.set_my_commands(Command::bot_commands()).await {
        Ok(_) => log::info!("Bot commands synced with Telegram"),
        Err(e) => log::warn!("Failed to sync bot commands: {}", e),
    }

    let extractor = Arc::new(YtDlp::new(&config.ytdlp_path));
    let queue = DownloadQueue::new(
        extractor,
        &config.downloads_dir,
        config.max_concurrent_downloads,
    );
    log::info!(
        "Download queue initialized ({} concurrent)",
        config.max_concurrent_downloads
    );

    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![queue])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    if let Err(e) = clear_dir(&config.downloads_dir).await {
        log::warn!("Failed to clear {}: {}", config.downloads_dir.display(), e);
    }
}
