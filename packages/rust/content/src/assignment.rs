//! Written-assignment chapter: an iframe onto the answers page, with the
//! task text passed as query parameters.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::embed::IframeParams;
use crate::node::ContentNode;

/// Answers page used when a request names none.
pub const DEFAULT_ANSWERS_URL: &str = "https://hep-impuls.github.io/textbox/answers.html";

/// `content` record of an `assignment` chapter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssignmentContent {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub instructions: Vec<String>,
}

/// `assignment` chapter record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssignmentInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: AssignmentContent,
    #[serde(default)]
    pub base_url: Option<String>,
}

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^<]+?>").expect("valid regex"));
static STRONG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<strong>(.*?)</strong>").expect("valid regex"));
static LIST_ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<li>(.*?)</li>").expect("valid regex"));
static ID_CHARS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9_-]").expect("valid regex"));

fn strip_tags(html: &str) -> String {
    TAG_RE.replace_all(html, "").to_string()
}

/// Plain text of an HTML fragment, keeping `<strong>` as `**bold**`.
fn to_plain_text(html: &str) -> String {
    let bolded = STRONG_RE.replace_all(html, "**$1**");
    strip_tags(&bolded)
}

/// Assignment id: spaces become `_`, anything outside `[A-Za-z0-9_-]` is dropped.
pub fn assignment_id(title: &str) -> String {
    ID_CHARS_RE
        .replace_all(&title.replace(' ', "_"), "")
        .to_string()
}

/// Sub-ids: the words of the plain-text title, without the filler word "und".
pub fn sub_ids(title_html: &str) -> String {
    strip_tags(title_html)
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|w| !w.is_empty() && *w != "und")
        .collect::<Vec<_>>()
        .join("_")
}

/// Text parts in page order: the title, then each instruction. Instructions
/// holding `<li>` items contribute one bullet part per item.
fn content_parts(content: &AssignmentContent) -> Vec<String> {
    let mut parts = vec![to_plain_text(&content.title)];
    for instruction in &content.instructions {
        if instruction.contains("<li>") {
            for item in LIST_ITEM_RE.captures_iter(instruction) {
                parts.push(format!(
                    "<span style=\"font-size: smaller;\">• {}</span>",
                    to_plain_text(&item[1])
                ));
            }
        } else {
            parts.push(to_plain_text(instruction));
        }
    }
    parts
}

/// Build the answers-page URL for an assignment.
pub fn assignment_url(input: &AssignmentInput, fallback_title: &str) -> Option<Url> {
    let base = input.base_url.as_deref().unwrap_or(DEFAULT_ANSWERS_URL);
    let mut url = match Url::parse(base) {
        Ok(url) => url,
        Err(e) => {
            warn!(base, error = %e, "invalid assignment base URL");
            return None;
        }
    };

    let id_source = input.title.as_deref().unwrap_or(fallback_title);
    let parts = content_parts(&input.content);
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("assignmentId", &assignment_id(id_source));
        query.append_pair("subIds", &sub_ids(&input.content.title));
        for (i, part) in parts.iter().enumerate() {
            query.append_pair(&format!("p{}", i + 1), part);
        }
    }

    debug!(params = parts.len(), len = url.as_str().len(), "built assignment URL");
    Some(url)
}

/// Build the assignment chapter. Returns `None` if the base URL is invalid.
pub fn build_assignment(input: &AssignmentInput, book_title: &str) -> Option<ContentNode> {
    let title = input
        .title
        .clone()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| "Aufgabe".to_string());
    let url = assignment_url(input, book_title)?;

    let embed = ContentNode::new(IframeParams::new(url.to_string(), "720", "1600"), title.clone());
    Some(ContentNode::column(title, vec![embed.into()]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Params;

    fn input() -> AssignmentInput {
        serde_json::from_str(
            r#"{"title": "Stellung nahme!",
                "content": {
                    "title": "<h2>Reflexion und Positionierung</h2>",
                    "instructions": [
                        "<p>Lies den <strong>Text</strong>.</p>",
                        "<ul><li><strong>Eins:</strong> erstens</li><li>zweitens</li></ul>"
                    ]
                }}"#,
        )
        .unwrap()
    }

    #[test]
    fn id_and_sub_ids() {
        assert_eq!(assignment_id("Stellung nahme!"), "Stellung_nahme");
        assert_eq!(sub_ids("<h2>Reflexion und Positionierung</h2>"), "Reflexion_Positionierung");
        assert_eq!(sub_ids(""), "");
    }

    #[test]
    fn parts_split_bullets() {
        let parts = content_parts(&input().content);
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0], "Reflexion und Positionierung");
        assert_eq!(parts[1], "Lies den **Text**.");
        assert!(parts[2].contains("• **Eins:** erstens"));
        assert!(parts[3].contains("• zweitens"));
    }

    #[test]
    fn url_carries_all_parameters() {
        let url = assignment_url(&input(), "Buch").unwrap();
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(pairs[0], ("assignmentId".into(), "Stellung_nahme".into()));
        assert_eq!(pairs[1].0, "subIds");
        assert_eq!(pairs[2], ("p1".into(), "Reflexion und Positionierung".into()));
        assert_eq!(pairs.len(), 6);
        assert!(url.as_str().starts_with(DEFAULT_ANSWERS_URL));
    }

    #[test]
    fn chapter_embeds_url() {
        let chapter = build_assignment(&input(), "Buch").unwrap();
        match &chapter.params.children()[0].params {
            Params::IframeEmbed(p) => {
                assert_eq!(p.width, "720");
                assert_eq!(p.height, "1600");
                assert!(p.source.contains("assignmentId=Stellung_nahme"));
            }
            other => panic!("expected iframe, got {other:?}"),
        }
    }

    #[test]
    fn invalid_base_url_skips_chapter() {
        let mut input = input();
        input.base_url = Some("not a url".into());
        assert!(build_assignment(&input, "Buch").is_none());
    }

    #[test]
    fn missing_title_falls_back_to_book_title() {
        let mut input = input();
        input.title = None;
        let url = assignment_url(&input, "Mein Buch").unwrap();
        assert!(url.as_str().contains("assignmentId=Mein_Buch"));
    }
}
