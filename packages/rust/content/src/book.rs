//! The book root: cover, chapters, behaviour flags and UI strings.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use booklet_shared::{BookletError, ImageInput, ImageReference, LibraryId, Result};

use crate::node::ContentNode;
use crate::normalize::replace_eszett;

// ---------------------------------------------------------------------------
// Cover
// ---------------------------------------------------------------------------

/// Cover record of a request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CoverInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub image: Option<ImageInput>,
}

/// `H5P.Image` parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageParams {
    pub content_name: String,
    pub file: ImageReference,
    pub decorative: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookCover {
    pub cover_description: String,
    pub cover_medium: ContentNode,
}

impl BookCover {
    /// Centered title (plus optional subtitle markup) over a decorative image.
    pub fn new(title: &str, subtitle: Option<&str>, image: ImageReference) -> Self {
        let mut cover_description = format!("<h2 style='text-align:center'>{title}</h2>");
        if let Some(subtitle) = subtitle.filter(|s| !s.trim().is_empty()) {
            if subtitle.trim_start().starts_with('<') {
                cover_description.push_str(subtitle);
            } else {
                cover_description.push_str(&format!("<p style='text-align:center'>{subtitle}</p>"));
            }
        }

        let cover_medium = ContentNode::new(
            ImageParams {
                content_name: "Bild".into(),
                file: image,
                decorative: true,
            },
            "Cover",
        );

        Self {
            cover_description,
            cover_medium,
        }
    }

    /// The cover image reference.
    pub fn image(&self) -> Option<&ImageReference> {
        self.cover_medium.params.images().into_iter().next()
    }
}

// ---------------------------------------------------------------------------
// Behaviour
// ---------------------------------------------------------------------------

/// Book-level behaviour flags.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Behaviour {
    pub base_color: String,
    pub default_table_of_contents: bool,
    pub progress_indicators: bool,
    pub progress_auto: bool,
    pub display_summary: bool,
    pub enable_retry: bool,
}

impl Default for Behaviour {
    fn default() -> Self {
        Self {
            base_color: "#002f6c".into(),
            default_table_of_contents: false,
            progress_indicators: true,
            progress_auto: true,
            display_summary: true,
            enable_retry: true,
        }
    }
}

// ---------------------------------------------------------------------------
// UI strings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct A11yStrings {
    progress: &'static str,
    menu: &'static str,
}

/// Fixed German UI strings, flattened into the book root.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookL10n {
    read: &'static str,
    #[serde(rename = "displayTOC")]
    display_toc: &'static str,
    #[serde(rename = "hideTOC")]
    hide_toc: &'static str,
    next_page: &'static str,
    previous_page: &'static str,
    chapter_completed: &'static str,
    part_completed: &'static str,
    incomplete_chapter: &'static str,
    navigate_to_top: &'static str,
    mark_as_finished: &'static str,
    fullscreen: &'static str,
    exit_fullscreen: &'static str,
    book_progress_subtext: &'static str,
    interactions_progress_subtext: &'static str,
    submit_report: &'static str,
    restart_label: &'static str,
    summary_header: &'static str,
    all_interactions: &'static str,
    unanswered_interactions: &'static str,
    score_text: &'static str,
    left_out_of_total_completed: &'static str,
    no_interactions: &'static str,
    score: &'static str,
    summary_and_submit: &'static str,
    no_chapter_interaction_bold_text: &'static str,
    no_chapter_interaction_text: &'static str,
    your_answers_are_submitted_for_review: &'static str,
    book_progress: &'static str,
    interactions_progress: &'static str,
    total_score_label: &'static str,
    a11y: A11yStrings,
}

pub static BOOK_L10N: BookL10n = BookL10n {
    read: "Starten",
    display_toc: "Inhaltsverzeichnis anzeigen",
    hide_toc: "Inhaltsverzeichnis ausblenden",
    next_page: "Nächste Seite",
    previous_page: "Vorherige Seite",
    chapter_completed: "Seite abgeschlossen!",
    part_completed: "@pages von @total Seiten abgeschlossen",
    incomplete_chapter: "Unvollständige Seite",
    navigate_to_top: "Nach oben springen",
    mark_as_finished: "Ich habe diese Seite abgeschlossen",
    fullscreen: "Vollbild",
    exit_fullscreen: "Vollbild beenden",
    book_progress_subtext: "@count von @total Seiten",
    interactions_progress_subtext: "@count von @total Interaktionen",
    submit_report: "Report absenden",
    restart_label: "Neustart",
    summary_header: "Zusammenfassung",
    all_interactions: "Alle Interaktionen",
    unanswered_interactions: "Unbeantwortete Interaktionen",
    score_text: "@score / @maxscore",
    left_out_of_total_completed: "@left von @max Interaktionen abgeschlossen",
    no_interactions: "Keine Interaktionen",
    score: "Punkte",
    summary_and_submit: "Zusammenfassung und Einsenden",
    no_chapter_interaction_bold_text: "Du hast noch keine Seiten bearbeitet.",
    no_chapter_interaction_text:
        "Du musst wenigstens eine Seite bearbeiten, um die Zusammenfassung zu sehen.",
    your_answers_are_submitted_for_review: "Deine Antworten wurden zur Begutachtung versendet!",
    book_progress: "Buchfortschritt",
    interactions_progress: "Interaktionsfortschritt",
    total_score_label: "Gesamtpunktzahl",
    a11y: A11yStrings {
        progress: "Seite @page von @total.",
        menu: "Inhaltsverzeichnis ein- bzw. ausschalten",
    },
};

// ---------------------------------------------------------------------------
// Book
// ---------------------------------------------------------------------------

/// Root of `content/content.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub show_cover_page: bool,
    pub book_cover: BookCover,
    pub chapters: Vec<ContentNode>,
    pub behaviour: Behaviour,
    #[serde(flatten)]
    pub l10n: &'static BookL10n,
}

impl Book {
    pub fn new(cover: BookCover, chapters: Vec<ContentNode>, behaviour: Behaviour) -> Self {
        Self {
            show_cover_page: true,
            book_cover: cover,
            chapters,
            behaviour,
            l10n: &BOOK_L10N,
        }
    }

    /// Visit the cover medium and every chapter node, parents first.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a ContentNode)) {
        self.book_cover.cover_medium.walk(visit);
        for chapter in &self.chapters {
            chapter.walk(visit);
        }
    }

    /// Every library used anywhere in the book.
    pub fn libraries(&self) -> Vec<LibraryId> {
        let mut libraries = Vec::new();
        self.walk(&mut |node| {
            if !libraries.contains(&node.library) {
                libraries.push(node.library);
            }
        });
        libraries
    }

    /// Every image path referenced by the book, cover first, without duplicates.
    pub fn image_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = Vec::new();
        self.walk(&mut |node| {
            for image in node.params.images() {
                if !paths.contains(&image.path) {
                    paths.push(image.path.clone());
                }
            }
        });
        paths
    }

    /// Convert to the final JSON document and run the text normalization
    /// pass over it. Call once, right before serialization.
    pub fn to_document(&self) -> Result<Value> {
        let mut document =
            serde_json::to_value(self).map_err(|e| BookletError::validation(e.to_string()))?;
        replace_eszett(&mut document);
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book() -> Book {
        let cover = BookCover::new(
            "Straßenbahn",
            Some("Ein Rückblick"),
            ImageReference::new("images/cover.jpg"),
        );
        let chapter = ContentNode::column("Kapitel", vec![ContentNode::text("<p>x</p>", "T").into()]);
        Book::new(cover, vec![chapter], Behaviour::default())
    }

    #[test]
    fn cover_description_markup() {
        let cover = BookCover::new("Titel", None, ImageReference::new("images/c.png"));
        assert_eq!(cover.cover_description, "<h2 style='text-align:center'>Titel</h2>");

        let cover = BookCover::new("Titel", Some("<h3>Unter</h3>"), ImageReference::new("images/c.png"));
        assert!(cover.cover_description.ends_with("<h3>Unter</h3>"));
        assert_eq!(cover.image().unwrap().path, "images/c.png");
    }

    #[test]
    fn serialized_root_has_flattened_l10n() {
        let json = serde_json::to_value(book()).unwrap();
        assert_eq!(json["showCoverPage"], true);
        assert_eq!(json["displayTOC"], "Inhaltsverzeichnis anzeigen");
        assert_eq!(json["a11y"]["menu"], "Inhaltsverzeichnis ein- bzw. ausschalten");
        assert_eq!(json["behaviour"]["baseColor"], "#002f6c");
        assert_eq!(json["bookCover"]["coverMedium"]["library"], "H5P.Image 1.1");
        assert_eq!(json["bookCover"]["coverMedium"]["params"]["contentName"], "Bild");
        assert_eq!(json["bookCover"]["coverMedium"]["params"]["decorative"], true);
        assert!(json.get("l10n").is_none());
    }

    #[test]
    fn document_is_normalized() {
        let document = book().to_document().unwrap();
        let text = document.to_string();
        assert!(!text.contains('ß'));
        assert!(text.contains("Strassenbahn"));
    }

    #[test]
    fn libraries_and_images() {
        let book = book();
        assert_eq!(
            book.libraries(),
            vec![LibraryId::IMAGE, LibraryId::COLUMN, LibraryId::ADVANCED_TEXT]
        );
        assert_eq!(book.image_paths(), vec!["images/cover.jpg".to_string()]);
    }
}
