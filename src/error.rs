use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::store::StoreError;

const INTERNAL_ERROR_MESSAGE: &str =
    "An error occurred processing your request. Please try again later.";

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Template error: {0}")]
    Template(#[from] handlebars::TemplateError),

    #[error("Render error: {0}")]
    Render(#[from] handlebars::RenderError),

    #[error("Feed error: {0}")]
    Feed(#[from] rss::Error),

    #[error("Handler task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("None of the supported types are acceptable: {}", .0.join(", "))]
    NotAcceptable(Vec<&'static str>),
}

impl ChannelError {
    pub fn status(&self) -> StatusCode {
        match self {
            ChannelError::Store(StoreError::NotFound(_) | StoreError::InvalidSlug(_)) => {
                StatusCode::NOT_FOUND
            }
            ChannelError::NotAcceptable(_) => StatusCode::NOT_ACCEPTABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ChannelError {
    fn into_response(self) -> Response {
        let status = self.status();
        match status {
            StatusCode::NOT_FOUND => (status, "404 page not found\n").into_response(),
            StatusCode::NOT_ACCEPTABLE => (status, format!("{self}\n")).into_response(),
            _ => {
                error!("Request failed: {}", self);
                (status, INTERNAL_ERROR_MESSAGE).into_response()
            }
        }
    }
}
