//! Iframe embeds and the plain iframe-page chapter.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::node::{ColumnItem, ContentNode, Separator, escape_html};

/// Width of an iframe on a plain embed page when none is given.
pub const DEFAULT_PAGE_WIDTH: &str = "100%";
/// Height of an iframe on a plain embed page when none is given.
pub const DEFAULT_PAGE_HEIGHT: &str = "600";
/// Minimum width of every iframe when none is given.
pub const DEFAULT_MIN_WIDTH: &str = "300";

/// A size given either as a number (`800`) or a string (`"100%"`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Dimension {
    Number(u64),
    Text(String),
}

impl Dimension {
    pub fn render(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(text) => text.trim().to_string(),
        }
    }
}

/// Render an optional dimension, falling back to `default`.
pub(crate) fn dimension_or(value: Option<&Dimension>, default: &str) -> String {
    value
        .map(Dimension::render)
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// `H5P.IFrameEmbed` parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IframeParams {
    pub source: String,
    pub width: String,
    pub height: String,
    pub resize_supported: bool,
    pub min_width: String,
}

impl IframeParams {
    pub fn new(source: impl Into<String>, width: impl Into<String>, height: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            width: width.into(),
            height: height.into(),
            resize_supported: true,
            min_width: DEFAULT_MIN_WIDTH.into(),
        }
    }
}

/// `embed` record of an `iframe_page` chapter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmbedInput {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub width: Option<Dimension>,
    #[serde(default)]
    pub height: Option<Dimension>,
    #[serde(default, alias = "minWidth")]
    pub min_width: Option<Dimension>,
}

/// `iframe_page` chapter record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IframePageInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub top_text: Option<String>,
    #[serde(default)]
    pub include_accordion_ref: bool,
    #[serde(default)]
    pub embed: EmbedInput,
}

/// Text node holding a link that opens `url` in a new tab.
pub(crate) fn link_text(url: &str, label: &str) -> ContentNode {
    ContentNode::text(
        format!(
            "<p><a href='{}' target='_blank'>{label}</a></p>",
            escape_html(url)
        ),
        "Link",
    )
}

/// Build a plain embed chapter.
///
/// The recap accordion is cloned in only when the page asks for it and
/// `recap` holds one from an earlier chapter.
pub fn build_iframe_page(input: &IframePageInput, recap: Option<&ContentNode>) -> ContentNode {
    let mut items: Vec<ColumnItem> = Vec::new();

    if let Some(top_text) = input.top_text.as_deref().filter(|t| !t.trim().is_empty()) {
        items.push(ContentNode::text(top_text, "Intro").into());
    }

    match (input.include_accordion_ref, recap) {
        (true, Some(accordion)) => {
            items.push(accordion.clone_with_fresh_id().into());
            items.push(link_text(&input.embed.source, "Direkter Link").into());
        }
        (true, None) => debug!("no earlier accordion to reuse on iframe page"),
        _ => {}
    }

    let embed = &input.embed;
    let mut params = IframeParams::new(
        embed.source.clone(),
        dimension_or(embed.width.as_ref(), DEFAULT_PAGE_WIDTH),
        dimension_or(embed.height.as_ref(), DEFAULT_PAGE_HEIGHT),
    );
    params.min_width = dimension_or(embed.min_width.as_ref(), DEFAULT_MIN_WIDTH);

    items.push(ColumnItem::with_separator(
        ContentNode::new(params, "Iframe"),
        Separator::Enabled,
    ));

    let title = input
        .title
        .clone()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| "Iframe".to_string());
    ContentNode::column(title, items)
}
