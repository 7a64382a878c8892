//! Accordion of titled text panels, used as a chapter of its own or cloned
//! into later chapters as a recap.

use serde::{Deserialize, Serialize};

use crate::node::ContentNode;

/// Metadata title of every accordion node.
pub const ACCORDION_TITLE: &str = "Zusammenfassung";

/// One `{title, text}` panel record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PanelInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
}

/// `accordion` chapter record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccordionChapterInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub panels: Vec<PanelInput>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    pub title: String,
    pub content: ContentNode,
}

/// `H5P.Accordion` parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccordionParams {
    pub panels: Vec<Panel>,
    pub h_tag: String,
}

/// Build an accordion node, one panel per record, in order.
pub fn build_accordion(panels: &[PanelInput]) -> ContentNode {
    let panels = panels
        .iter()
        .map(|panel| Panel {
            title: panel.title.clone(),
            content: ContentNode::text(panel.text.clone(), "Text"),
        })
        .collect();

    ContentNode::new(
        AccordionParams {
            panels,
            h_tag: "h2".into(),
        },
        ACCORDION_TITLE,
    )
}

/// Wrap an accordion into a chapter. Returns the chapter and the accordion
/// node so later chapters can clone it.
pub fn build_accordion_chapter(input: &AccordionChapterInput) -> (ContentNode, ContentNode) {
    let accordion = build_accordion(&input.panels);
    let title = input
        .title
        .clone()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| ACCORDION_TITLE.to_string());
    let chapter = ContentNode::column(title, vec![accordion.clone().into()]);
    (chapter, accordion)
}
