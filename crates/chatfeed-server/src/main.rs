mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use chatfeed_api::routes::AppStateInner;
use chatfeed_gateway::SlackClient;
use chatfeed_markup::EmojiTable;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    "chatfeed_server=debug,chatfeed_api=debug,chatfeed_gateway=debug,chatfeed_markup=debug,tower_http=debug"
                        .into()
                }),
        )
        .init();

    let config = Config::from_env()?;

    // Emoji table is read once and shared for the process lifetime
    let emoji = match &config.emoji_path {
        Some(path) => EmojiTable::load(path)?,
        None => EmojiTable::bundled().clone(),
    };
    if emoji.is_empty() {
        warn!("Emoji table is empty; short codes will render as nothing");
    }

    let slack = SlackClient::new(config.slack.clone())?;

    let state = Arc::new(AppStateInner {
        slack,
        emoji: Arc::new(emoji),
        max_messages: config.max_messages,
    });

    let app = chatfeed_api::router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("chatfeed listening on {}", addr);
    info!(
        "Channel {}: showing {} of the last {} messages",
        config.slack.channel_id, config.max_messages, config.slack.history_limit
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
