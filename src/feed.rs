//! RSS 2.0 feed for a channel's index.

use chrono::Utc;
use rss::{Channel, ChannelBuilder, GuidBuilder, Item, ItemBuilder};

use crate::models::{Person, PostBlurb};

pub const RSS_MIME_TYPE: &str = "application/rss+xml";

pub struct FeedConfig {
    pub title: String,
    pub description: String,
    /// Absolute URL of the channel's index page.
    pub link: String,
}

/// Builds the feed and serializes it. `post_url` maps a slug to the item's
/// absolute link.
pub fn write_feed(
    config: FeedConfig,
    posts: &[PostBlurb],
    post_url: impl Fn(&str) -> String,
) -> Result<Vec<u8>, rss::Error> {
    feed(config, posts, post_url).write_to(Vec::new())
}

fn feed(config: FeedConfig, posts: &[PostBlurb], post_url: impl Fn(&str) -> String) -> Channel {
    let items: Vec<Item> = posts.iter().map(|post| item(post, post_url(&post.slug))).collect();

    ChannelBuilder::default()
        .title(config.title)
        .link(config.link)
        .description(config.description)
        .last_build_date(Utc::now().to_rfc2822())
        .items(items)
        .build()
}

fn item(post: &PostBlurb, link: String) -> Item {
    ItemBuilder::default()
        .title(post.title.clone())
        .guid(GuidBuilder::default().value(link.clone()).permalink(true).build())
        .link(link)
        .author(author_field(&post.author))
        .pub_date(post.created.to_rfc2822())
        .description(post.teaser_html.clone())
        .build()
}

/// RSS wants an email address here; a bare name is used when that is all we
/// have.
fn author_field(person: &Person) -> Option<String> {
    if person.is_empty() {
        return None;
    }
    match (person.name.is_empty(), person.email.is_empty()) {
        (_, true) => Some(person.name.clone()),
        (true, false) => Some(person.email.clone()),
        (false, false) => Some(format!("{} ({})", person.email, person.name)),
    }
}
