use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::Context;
use axum::{http::StatusCode, routing::get_service, Router};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod channel;
mod config;
mod content_loader;
mod error;
mod feed;
mod file_meta;
mod markdown;
mod models;
mod negotiate;
mod parser;
mod render;
mod store;

use channel::{redirect, Channel, OpenStore};
use config::Config;
use content_loader::FilesystemStore;
use file_meta::{FileMetadata, SystemMetadata};
use store::PostStore;

const DEFAULT_CONFIG_PATH: &str = "channel.toml";

fn build_app(config: &Config) -> Router {
    let metadata: Arc<dyn FileMetadata> = Arc::new(SystemMetadata);
    let posts_dir = config.channel.posts_dir.clone();
    let open_store: OpenStore = Arc::new(move |index_path: &str| {
        Box::new(FilesystemStore::new(posts_dir.clone(), index_path, metadata.clone()))
            as Box<dyn PostStore>
    });

    let channel = Arc::new(Channel::new(&config.channel, open_store));
    let index_path = channel.index_path();
    let mut app = channel.routes();

    if index_path != "/" {
        app = app.route("/", redirect(StatusCode::FOUND, index_path));
    }
    if let Some(static_dir) = &config.server.static_dir {
        info!(dir = %static_dir.display(), "serving static files under /static");
        app = app.nest_service("/static", get_service(ServeDir::new(static_dir)));
    }
    app
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path = std::env::var("CHANNEL_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
    let mut config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    config.apply_env(std::env::var("PORT").ok());

    info!(
        title = %config.channel.title,
        posts_dir = %config.channel.posts_dir.display(),
        templates_dir = %config.channel.templates_dir.display(),
        "channel configured"
    );

    let app = build_app(&config);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!(%addr, "listening");
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app).await?;
    Ok(())
}
