use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, MethodRouter},
    Router,
};
use tracing::{debug, info};

use crate::config::ChannelConfig;
use crate::error::ChannelError;
use crate::feed::{write_feed, FeedConfig, RSS_MIME_TYPE};
use crate::models::IndexModel;
use crate::render::{render_model, Page, Representation};
use crate::store::PostStore;

/// Opens a store for a request, given the channel's index path.
pub type OpenStore = Arc<dyn Fn(&str) -> Box<dyn PostStore> + Send + Sync>;

/// A published directory of posts mounted under `base_path`.
pub struct Channel {
    pub title: String,
    pub description: String,
    /// No trailing slash; empty when mounted at the site root.
    pub base_path: String,
    pub index_title: String,
    pub templates_dir: PathBuf,
    open_store: OpenStore,
}

impl Channel {
    pub fn new(config: &ChannelConfig, open_store: OpenStore) -> Self {
        Self {
            title: config.title.clone(),
            description: config.description.clone(),
            base_path: config.base_path.clone(),
            index_title: config.index_title.clone(),
            templates_dir: config.templates_dir.clone(),
            open_store,
        }
    }

    pub fn index_path(&self) -> String {
        format!("{}/", self.base_path)
    }

    pub fn post_path(&self, slug: &str) -> String {
        format!("{}/{}", self.base_path, slug)
    }

    fn open_store(&self) -> Box<dyn PostStore> {
        (self.open_store)(&self.index_path())
    }

    pub fn routes(self: Arc<Self>) -> Router {
        let index = self.index_path();
        info!(base_path = %self.base_path, "registering channel routes");

        let mut router = Router::new();
        if !self.base_path.is_empty() {
            router = router.route(
                &self.base_path,
                redirect(StatusCode::MOVED_PERMANENTLY, index.clone()),
            );
        }
        router
            .route(&index, get(index_handler))
            .route(&format!("{}/rss", self.base_path), get(rss_handler))
            .route(&format!("{}/{{slug}}", self.base_path), get(post_handler))
            .with_state(self)
    }
}

pub fn redirect<S>(status: StatusCode, location: String) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    get(move || {
        let location = location.clone();
        async move { (status, [(header::LOCATION, location)]) }
    })
}

async fn index_handler(
    State(channel): State<Arc<Channel>>,
    headers: HeaderMap,
) -> Result<Response, ChannelError> {
    tokio::task::spawn_blocking(move || -> Result<Response, ChannelError> {
        let posts = channel.open_store().index()?;
        debug!("Listing {} posts", posts.len());

        let model = IndexModel {
            title: channel.index_title.clone(),
            posts,
        };
        let representation = Representation::negotiate(&headers)?;
        render_model(representation, &channel.templates_dir, Page::Index, &model)
    })
    .await?
}

async fn post_handler(
    State(channel): State<Arc<Channel>>,
    Path(slug): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ChannelError> {
    tokio::task::spawn_blocking(move || -> Result<Response, ChannelError> {
        debug!("Loading post {:?}", slug);
        let model = channel.open_store().get(&slug)?;
        let representation = Representation::negotiate(&headers)?;
        render_model(representation, &channel.templates_dir, Page::Post, &model)
    })
    .await?
}

async fn rss_handler(
    State(channel): State<Arc<Channel>>,
    headers: HeaderMap,
) -> Result<Response, ChannelError> {
    let host = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    tokio::task::spawn_blocking(move || -> Result<Response, ChannelError> {
        let posts = channel.open_store().index()?;
        let config = FeedConfig {
            title: channel.title.clone(),
            description: channel.description.clone(),
            link: absolute_url(host.as_deref(), &channel.index_path()),
        };
        let xml = write_feed(config, &posts, |slug| {
            absolute_url(host.as_deref(), &channel.post_path(slug))
        })?;
        Ok(([(header::CONTENT_TYPE, RSS_MIME_TYPE)], xml).into_response())
    })
    .await?
}

/// Prefixes `path` with `http://host` when the request named a host.
fn absolute_url(host: Option<&str>, path: &str) -> String {
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };
    match host {
        Some(host) if !host.is_empty() => format!("http://{host}{path}"),
        _ => path,
    }
}
