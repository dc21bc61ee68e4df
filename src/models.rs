use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Person {
    pub name: String,
    pub email: String,
}

impl Person {
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.email.is_empty()
    }
}

/// Summary of a post as shown in listings and feeds.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct PostBlurb {
    pub title: String,
    pub author: Person,
    pub created: DateTime<Utc>,
    pub slug: String,
    #[serde(rename = "Blurb")]
    pub teaser_html: String,
}

/// A single full post. Serializes with the blurb fields flattened alongside
/// `IndexPath` and `Content`.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct PostModel {
    #[serde(flatten)]
    pub blurb: PostBlurb,
    pub index_path: String,
    #[serde(rename = "Content")]
    pub body_html: String,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct IndexModel {
    pub title: String,
    pub posts: Vec<PostBlurb>,
}
