//! Video chapter: heading, embedded player, fallback link and a recap
//! accordion that later chapters may reuse.

use serde::Deserialize;

use crate::accordion::{PanelInput, build_accordion};
use crate::embed::{Dimension, IframeParams, dimension_or};
use crate::node::{ContentNode, escape_html};

const DEFAULT_VIDEO_WIDTH: &str = "800";
const DEFAULT_VIDEO_HEIGHT: &str = "400";
const DEFAULT_LINK_LABEL: &str = "SRF";

/// `video` record of a `video_page` chapter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoInput {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub width: Option<Dimension>,
    #[serde(default)]
    pub height: Option<Dimension>,
}

/// `video_page` chapter record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoPageInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub video: VideoInput,
    #[serde(default)]
    pub summary_accordion: Vec<PanelInput>,
    #[serde(default)]
    pub link_label: Option<String>,
}

/// A built video chapter and its accordion, kept for reuse.
#[derive(Debug, Clone)]
pub struct VideoPage {
    pub chapter: ContentNode,
    pub accordion: ContentNode,
}

/// Build the video chapter.
pub fn build_video_page(input: &VideoPageInput) -> VideoPage {
    let heading = ContentNode::text(format!("<h2>{}</h2>", input.title), "Title");

    let player = ContentNode::new(
        IframeParams::new(
            input.video.url.clone(),
            dimension_or(input.video.width.as_ref(), DEFAULT_VIDEO_WIDTH),
            dimension_or(input.video.height.as_ref(), DEFAULT_VIDEO_HEIGHT),
        ),
        "Video",
    );

    let label = input.link_label.as_deref().unwrap_or(DEFAULT_LINK_LABEL);
    let notice = ContentNode::text(
        format!(
            "<p>❗ Falls die Meldung 'Ihr Webbrowser wird nicht unterstützt' kommt, 👉 Seite neu laden löst meistens das Problem.</p>\
<p>Link zum Video 👉 <a href='{}' target='_blank'>{label}</a></p>",
            escape_html(&input.video.url)
        ),
        "Link",
    );

    let accordion = build_accordion(&input.summary_accordion);

    let chapter = ContentNode::column(
        input.title.clone(),
        vec![
            heading.into(),
            player.into(),
            notice.into(),
            accordion.clone().into(),
        ],
    );

    VideoPage { chapter, accordion }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Params;
    use booklet_shared::LibraryId;

    fn input() -> VideoPageInput {
        serde_json::from_str(
            r#"{"title": "Rückblick", "video": {"url": "https://srf.ch/v/1"},
                "summary_accordion": [{"title": "Teil 1", "text": "<p>Text</p>"}]}"#,
        )
        .unwrap()
    }

    #[test]
    fn video_page_has_four_items_in_order() {
        let page = build_video_page(&input());
        let children = page.chapter.params.children();
        let libraries: Vec<_> = children.iter().map(|c| c.library).collect();
        assert_eq!(
            libraries,
            vec![
                LibraryId::ADVANCED_TEXT,
                LibraryId::IFRAME_EMBED,
                LibraryId::ADVANCED_TEXT,
                LibraryId::ACCORDION,
            ]
        );
        assert_eq!(children[3], &page.accordion);
    }

    #[test]
    fn player_uses_default_size() {
        let page = build_video_page(&input());
        match &page.chapter.params.children()[1].params {
            Params::IframeEmbed(p) => {
                assert_eq!(p.source, "https://srf.ch/v/1");
                assert_eq!(p.width, "800");
                assert_eq!(p.height, "400");
                assert_eq!(p.min_width, "300");
            }
            other => panic!("expected iframe, got {other:?}"),
        }
    }

    #[test]
    fn notice_links_to_video() {
        let page = build_video_page(&input());
        match &page.chapter.params.children()[2].params {
            Params::Text(t) => assert!(t.text.contains("href='https://srf.ch/v/1'")),
            other => panic!("expected text, got {other:?}"),
        }
    }
}
