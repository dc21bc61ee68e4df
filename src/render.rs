//! Turns channel models into response bodies.

use std::path::Path;

use axum::{
    http::{header, HeaderMap, HeaderValue},
    response::{Html, IntoResponse, Response},
    Json,
};
use handlebars::Handlebars;
use serde::Serialize;

use crate::error::ChannelError;
use crate::negotiate::negotiate;

const LAYOUT_TEMPLATE: &str = "layout";
const TEMPLATE_EXT: &str = "hbs";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Representation {
    Json,
    Html,
}

impl Representation {
    /// Negotiable representations, in order of preference on ties.
    pub const ALL: [Representation; 2] = [Representation::Json, Representation::Html];

    pub fn mime(self) -> &'static str {
        match self {
            Representation::Json => "application/json",
            Representation::Html => "text/html",
        }
    }

    pub fn from_mime(mime: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.mime() == mime)
    }

    pub fn negotiate(headers: &HeaderMap) -> Result<Self, ChannelError> {
        let accept = headers
            .get_all(header::ACCEPT)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .collect::<Vec<_>>()
            .join(", ");
        let candidates = Self::ALL.map(Representation::mime);

        negotiate(&accept, &candidates)
            .and_then(Self::from_mime)
            .ok_or_else(|| ChannelError::NotAcceptable(candidates.to_vec()))
    }
}

/// Page templates a model can be rendered through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Index,
    Post,
}

impl Page {
    fn template(self) -> &'static str {
        match self {
            Page::Index => "index",
            Page::Post => "post",
        }
    }
}

/// Renders `model` through the layout and the page template. Templates are
/// read from disk on every call.
pub fn render_html<T: Serialize>(
    templates_dir: &Path,
    page: Page,
    model: &T,
) -> Result<String, ChannelError> {
    let mut handlebars = Handlebars::new();
    for name in [LAYOUT_TEMPLATE, page.template()] {
        handlebars.register_template_file(
            name,
            templates_dir.join(format!("{name}.{TEMPLATE_EXT}")),
        )?;
    }
    Ok(handlebars.render(page.template(), model)?)
}

pub fn render_model<T: Serialize>(
    representation: Representation,
    templates_dir: &Path,
    page: Page,
    model: &T,
) -> Result<Response, ChannelError> {
    let mut response = match representation {
        Representation::Json => Json(model).into_response(),
        Representation::Html => Html(render_html(templates_dir, page, model)?).into_response(),
    };
    response
        .headers_mut()
        .insert(header::VARY, HeaderValue::from_static("accept"));
    Ok(response)
}
