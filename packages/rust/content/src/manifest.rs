//! The package metadata document (`h5p.json`).

use serde::Serialize;

use booklet_shared::LibraryId;

use crate::book::Book;

/// Libraries every package preloads, whether or not the book uses them.
pub const BASE_DEPENDENCIES: [LibraryId; 16] = [
    LibraryId::IMAGE,
    LibraryId::ADVANCED_TEXT,
    LibraryId::ACCORDION,
    LibraryId::new("FontAwesome", 4, 5),
    LibraryId::COLUMN,
    LibraryId::IFRAME_EMBED,
    LibraryId::MEMORY_GAME,
    LibraryId::QUESTION_SET,
    LibraryId::MULTI_CHOICE,
    LibraryId::TRUE_FALSE,
    LibraryId::DRAG_TEXT,
    LibraryId::new("H5P.JoubelUI", 1, 3),
    LibraryId::new("H5P.Transition", 1, 0),
    LibraryId::new("H5P.FontIcons", 1, 0),
    LibraryId::new("H5P.Question", 1, 5),
    LibraryId::INTERACTIVE_BOOK,
];

/// One `preloadedDependencies` entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    pub machine_name: String,
    pub major_version: u16,
    pub minor_version: u16,
}

impl From<LibraryId> for Dependency {
    fn from(id: LibraryId) -> Self {
        Self {
            machine_name: id.machine_name.to_string(),
            major_version: id.major,
            minor_version: id.minor,
        }
    }
}

/// Root of `h5p.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageMetadata {
    pub embed_types: Vec<String>,
    pub language: String,
    pub default_language: String,
    pub license: String,
    pub title: String,
    pub main_library: String,
    pub preloaded_dependencies: Vec<Dependency>,
}

impl PackageMetadata {
    /// Metadata for `book`: the base table plus any library the book uses
    /// that the table lacks.
    pub fn for_book(title: &str, book: &Book) -> Self {
        let mut libraries: Vec<LibraryId> = BASE_DEPENDENCIES.to_vec();
        for library in book.libraries() {
            if !libraries.contains(&library) {
                libraries.push(library);
            }
        }

        Self {
            embed_types: vec!["iframe".into()],
            language: "en".into(),
            default_language: "de".into(),
            license: "U".into(),
            title: title.to_string(),
            main_library: LibraryId::INTERACTIVE_BOOK.machine_name.to_string(),
            preloaded_dependencies: libraries.into_iter().map(Dependency::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::{Behaviour, BookCover};
    use crate::summary::{SummaryChapterInput, build_summary};
    use booklet_shared::ImageReference;

    fn cover() -> BookCover {
        BookCover::new("T", None, ImageReference::new("images/c.png"))
    }

    #[test]
    fn base_table_only() {
        let book = Book::new(cover(), vec![], Behaviour::default());
        let meta = PackageMetadata::for_book("Mein Buch", &book);
        assert_eq!(meta.preloaded_dependencies.len(), 16);

        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["mainLibrary"], "H5P.InteractiveBook");
        assert_eq!(json["embedTypes"], serde_json::json!(["iframe"]));
        assert_eq!(json["defaultLanguage"], "de");
        assert_eq!(json["preloadedDependencies"][3]["machineName"], "FontAwesome");
        assert_eq!(json["preloadedDependencies"][3]["majorVersion"], 4);
    }

    #[test]
    fn extra_libraries_are_appended() {
        let chapter = build_summary(&SummaryChapterInput::default());
        let book = Book::new(cover(), vec![chapter], Behaviour::default());
        let meta = PackageMetadata::for_book("Mein Buch", &book);
        assert_eq!(meta.preloaded_dependencies.len(), 17);
        assert_eq!(
            meta.preloaded_dependencies.last().unwrap().machine_name,
            "H5P.Summary"
        );
    }
}
