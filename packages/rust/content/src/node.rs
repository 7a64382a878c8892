//! The content tree: nodes, their typed parameter payloads, and column chapters.
//!
//! A node's library id is always derived from its parameter payload, so a
//! `H5P.Column` id can never carry accordion parameters.

use serde::Serialize;

use booklet_shared::{ImageReference, LibraryId, NodeMetadata, SubContentId};

use crate::accordion::AccordionParams;
use crate::book::ImageParams;
use crate::embed::IframeParams;
use crate::memory::MemoryGameParams;
use crate::questions::{DragTextParams, MultiChoiceParams, QuestionSetParams, TrueFalseParams};
use crate::summary::SummaryParams;

// ---------------------------------------------------------------------------
// ContentNode
// ---------------------------------------------------------------------------

/// One node of the content tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentNode {
    pub sub_content_id: SubContentId,
    pub library: LibraryId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<NodeMetadata>,
    pub params: Params,
}

impl ContentNode {
    /// Create a node with a fresh id and default metadata titled `title`.
    pub fn new(params: impl Into<Params>, title: impl Into<String>) -> Self {
        let params = params.into();
        let library = params.library();
        Self {
            sub_content_id: SubContentId::new(),
            library,
            metadata: Some(NodeMetadata::new(library, title)),
            params,
        }
    }

    /// An `H5P.AdvancedText` node holding an HTML fragment.
    pub fn text(html: impl Into<String>, title: impl Into<String>) -> Self {
        Self::new(TextParams { text: html.into() }, title)
    }

    /// An `H5P.Column` chapter holding `items` in order.
    pub fn column(title: impl Into<String>, items: Vec<ColumnItem>) -> Self {
        Self::new(ColumnParams { content: items }, title)
    }

    /// Deep copy with a new top-level id. Everything else stays equal.
    pub fn clone_with_fresh_id(&self) -> Self {
        Self {
            sub_content_id: SubContentId::new(),
            ..self.clone()
        }
    }

    /// Metadata title, if any.
    pub fn title(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(|m| m.title.as_deref())
    }

    /// Visit this node and every descendant, parents first.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a ContentNode)) {
        visit(self);
        for child in self.params.children() {
            child.walk(visit);
        }
    }
}

// ---------------------------------------------------------------------------
// Params
// ---------------------------------------------------------------------------

/// Typed parameter payload of a node. Serialized without a tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Params {
    Text(TextParams),
    Column(ColumnParams),
    Accordion(AccordionParams),
    IframeEmbed(IframeParams),
    Image(ImageParams),
    MemoryGame(MemoryGameParams),
    QuestionSet(QuestionSetParams),
    MultiChoice(MultiChoiceParams),
    TrueFalse(TrueFalseParams),
    DragText(DragTextParams),
    Summary(SummaryParams),
}

impl Params {
    /// The library that renders this payload.
    pub fn library(&self) -> LibraryId {
        match self {
            Self::Text(_) => LibraryId::ADVANCED_TEXT,
            Self::Column(_) => LibraryId::COLUMN,
            Self::Accordion(_) => LibraryId::ACCORDION,
            Self::IframeEmbed(_) => LibraryId::IFRAME_EMBED,
            Self::Image(_) => LibraryId::IMAGE,
            Self::MemoryGame(_) => LibraryId::MEMORY_GAME,
            Self::QuestionSet(_) => LibraryId::QUESTION_SET,
            Self::MultiChoice(_) => LibraryId::MULTI_CHOICE,
            Self::TrueFalse(_) => LibraryId::TRUE_FALSE,
            Self::DragText(_) => LibraryId::DRAG_TEXT,
            Self::Summary(_) => LibraryId::SUMMARY,
        }
    }

    /// Directly nested content nodes.
    pub fn children(&self) -> Vec<&ContentNode> {
        match self {
            Self::Column(p) => p.content.iter().map(|item| &item.content).collect(),
            Self::Accordion(p) => p.panels.iter().map(|panel| &panel.content).collect(),
            Self::QuestionSet(p) => p.questions.iter().collect(),
            _ => Vec::new(),
        }
    }

    /// Image references held directly by this payload.
    pub fn images(&self) -> Vec<&ImageReference> {
        match self {
            Self::Image(p) => vec![&p.file],
            Self::MemoryGame(p) => p.images(),
            Self::QuestionSet(p) => p.intro_page.background_image.iter().collect(),
            _ => Vec::new(),
        }
    }
}

macro_rules! params_from {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Params {
                fn from(params: $ty) -> Self {
                    Self::$variant(params)
                }
            }
        )*
    };
}

params_from! {
    Text => TextParams,
    Column => ColumnParams,
    Accordion => AccordionParams,
    IframeEmbed => IframeParams,
    Image => ImageParams,
    MemoryGame => MemoryGameParams,
    QuestionSet => QuestionSetParams,
    MultiChoice => MultiChoiceParams,
    TrueFalse => TrueFalseParams,
    DragText => DragTextParams,
    Summary => SummaryParams,
}

/// `H5P.AdvancedText` parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextParams {
    pub text: String,
}

/// `H5P.Column` parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnParams {
    pub content: Vec<ColumnItem>,
}

// ---------------------------------------------------------------------------
// Column items
// ---------------------------------------------------------------------------

/// Separator hint rendered above a column item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Separator {
    #[default]
    Auto,
    Enabled,
    Disabled,
}

/// One entry of a column chapter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnItem {
    pub use_separator: Separator,
    pub content: ContentNode,
}

impl ColumnItem {
    pub fn new(content: ContentNode) -> Self {
        Self {
            use_separator: Separator::Auto,
            content,
        }
    }

    pub fn with_separator(content: ContentNode, use_separator: Separator) -> Self {
        Self {
            use_separator,
            content,
        }
    }
}

impl From<ContentNode> for ColumnItem {
    fn from(content: ContentNode) -> Self {
        Self::new(content)
    }
}

/// Escape text for inclusion in an HTML fragment.
pub(crate) fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_library_follows_params() {
        let node = ContentNode::text("<p>Hi</p>", "Text");
        assert_eq!(node.library, LibraryId::ADVANCED_TEXT);
        assert_eq!(node.title(), Some("Text"));

        let column = ContentNode::column("Chapter", vec![node.into()]);
        assert_eq!(column.library, LibraryId::COLUMN);
        assert_eq!(column.params.children().len(), 1);
    }

    #[test]
    fn clone_gets_fresh_id_but_equal_fields() {
        let inner = ContentNode::text("<p>Straße</p>", "Text");
        let original = ContentNode::column("Chapter", vec![inner.into()]);
        let clone = original.clone_with_fresh_id();

        assert_ne!(clone.sub_content_id, original.sub_content_id);
        assert_eq!(clone.library, original.library);
        assert_eq!(clone.metadata, original.metadata);
        assert_eq!(clone.params, original.params);
    }

    #[test]
    fn serializes_with_h5p_keys() {
        let node = ContentNode::text("<p>Hi</p>", "Text");
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["library"], "H5P.AdvancedText 1.1");
        assert_eq!(json["params"], serde_json::json!({"text": "<p>Hi</p>"}));
        assert_eq!(json["metadata"]["contentType"], "Text");
        assert_eq!(json["subContentId"], node.sub_content_id.to_string());
    }

    #[test]
    fn column_items_serialize_separator() {
        let item = ColumnItem::with_separator(ContentNode::text("x", "T"), Separator::Enabled);
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["useSeparator"], "enabled");
    }

    #[test]
    fn walk_visits_every_node() {
        let chapter = ContentNode::column(
            "Chapter",
            vec![
                ContentNode::text("a", "A").into(),
                ContentNode::text("b", "B").into(),
            ],
        );
        let mut seen = Vec::new();
        chapter.walk(&mut |node| seen.push(node.library));
        assert_eq!(
            seen,
            vec![LibraryId::COLUMN, LibraryId::ADVANCED_TEXT, LibraryId::ADVANCED_TEXT]
        );
    }

    #[test]
    fn escape_html_handles_markup() {
        assert_eq!(escape_html("a<b> & 'c'"), "a&lt;b&gt; &amp; &#39;c&#39;");
    }
}
