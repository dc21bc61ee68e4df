use thiserror::Error;

use crate::models::{PostBlurb, PostModel};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Post not found: {0}")]
    NotFound(String),

    #[error("Invalid post slug: {0:?}")]
    InvalidSlug(String),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),
}

/// Read-only access to a channel's posts.
pub trait PostStore: Send {
    /// Every post as a blurb, newest first.
    fn index(&self) -> Result<Vec<PostBlurb>, StoreError>;

    fn get(&self, slug: &str) -> Result<PostModel, StoreError>;
}

/// Rejects slugs that could escape the post directory when joined into a
/// path.
pub fn validate_slug(slug: &str) -> Result<(), StoreError> {
    let bad = slug.is_empty()
        || slug.starts_with('.')
        || slug.contains(['/', '\\', '\0'])
        || slug.contains("..")
        || std::path::Path::new(slug).is_absolute()
        || slug.chars().nth(1) == Some(':');

    if bad {
        Err(StoreError::InvalidSlug(slug.to_string()))
    } else {
        Ok(())
    }
}
