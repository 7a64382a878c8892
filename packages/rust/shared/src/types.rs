//! Core domain types shared by the assembler, the package builder and the CLI.

use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

/// Display size written into every image reference.
pub const IMAGE_DISPLAY_SIZE: u32 = 50;

// ---------------------------------------------------------------------------
// SubContentId
// ---------------------------------------------------------------------------

/// A random UUID v4 identifying one node instance inside the content tree.
///
/// Never derived from content: two identical nodes still get distinct ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubContentId(pub Uuid);

impl SubContentId {
    /// Generate a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubContentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SubContentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for SubContentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ---------------------------------------------------------------------------
// LibraryId
// ---------------------------------------------------------------------------

/// An H5P library name plus major.minor version, e.g. `H5P.Column 1.18`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LibraryId {
    pub machine_name: &'static str,
    pub major: u16,
    pub minor: u16,
}

impl LibraryId {
    pub const fn new(machine_name: &'static str, major: u16, minor: u16) -> Self {
        Self {
            machine_name,
            major,
            minor,
        }
    }

    pub const COLUMN: Self = Self::new("H5P.Column", 1, 18);
    pub const ADVANCED_TEXT: Self = Self::new("H5P.AdvancedText", 1, 1);
    pub const ACCORDION: Self = Self::new("H5P.Accordion", 1, 0);
    pub const IFRAME_EMBED: Self = Self::new("H5P.IFrameEmbed", 1, 0);
    pub const IMAGE: Self = Self::new("H5P.Image", 1, 1);
    pub const MEMORY_GAME: Self = Self::new("H5P.MemoryGame", 1, 3);
    pub const QUESTION_SET: Self = Self::new("H5P.QuestionSet", 1, 20);
    pub const MULTI_CHOICE: Self = Self::new("H5P.MultiChoice", 1, 16);
    pub const TRUE_FALSE: Self = Self::new("H5P.TrueFalse", 1, 8);
    pub const DRAG_TEXT: Self = Self::new("H5P.DragText", 1, 10);
    pub const SUMMARY: Self = Self::new("H5P.Summary", 1, 10);
    pub const INTERACTIVE_BOOK: Self = Self::new("H5P.InteractiveBook", 1, 11);

    /// Human-readable content type label used in node metadata.
    pub fn content_type(&self) -> &'static str {
        match self.machine_name {
            "H5P.Column" => "Column",
            "H5P.AdvancedText" => "Text",
            "H5P.Accordion" => "Accordion",
            "H5P.IFrameEmbed" => "Iframe Embedder",
            "H5P.Image" => "Image",
            "H5P.MemoryGame" => "Memory Game",
            "H5P.QuestionSet" => "Question Set",
            "H5P.MultiChoice" => "Multiple Choice",
            "H5P.TrueFalse" => "True/False",
            "H5P.DragText" => "Drag the Words",
            "H5P.Summary" => "Summary",
            "H5P.InteractiveBook" => "Interactive Book",
            other => other.strip_prefix("H5P.").unwrap_or(other),
        }
    }
}

impl std::fmt::Display for LibraryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}.{}", self.machine_name, self.major, self.minor)
    }
}

impl Serialize for LibraryId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ---------------------------------------------------------------------------
// License / Copyright
// ---------------------------------------------------------------------------

/// Normalized license code as understood by H5P.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum License {
    #[serde(rename = "CC BY-SA")]
    CcBySa,
    #[serde(rename = "CC BY")]
    CcBy,
    #[serde(rename = "PD")]
    PublicDomain,
    #[serde(rename = "C")]
    Copyrighted,
    #[default]
    #[serde(rename = "U")]
    Undisclosed,
}

impl License {
    /// Map free-form license text to a code. Unrecognized text is `U`.
    pub fn from_text(text: &str) -> Self {
        if text.contains("CC BY-SA") {
            Self::CcBySa
        } else if text.contains("CC BY") || text.contains("Attribution") {
            Self::CcBy
        } else if text.contains("Public Domain") || text.contains("CC0") {
            Self::PublicDomain
        } else if text.contains("Copyright") {
            Self::Copyrighted
        } else {
            Self::Undisclosed
        }
    }

    fn is_creative_commons(self) -> bool {
        matches!(self, Self::CcBySa | Self::CcBy)
    }
}

/// Copyright information as it arrives in a request.
///
/// Either bare license text (`"CC BY 4.0"`) or a record.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CopyrightInput {
    Text(String),
    Record {
        #[serde(default)]
        license: String,
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        author: Option<String>,
        #[serde(default)]
        year: Option<String>,
        #[serde(default)]
        source: Option<String>,
        #[serde(default)]
        version: Option<String>,
    },
}

/// Normalized copyright block attached to every image reference.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Copyright {
    pub license: License,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl Copyright {
    /// The `{"license": "U"}` block used when nothing is known.
    pub fn undisclosed() -> Self {
        Self::default()
    }

    /// Normalize a request-side copyright record.
    pub fn from_input(input: &CopyrightInput) -> Self {
        let (text, title, author, year, source, version) = match input {
            CopyrightInput::Text(text) => (text.as_str(), None, None, None, None, None),
            CopyrightInput::Record {
                license,
                title,
                author,
                year,
                source,
                version,
            } => (
                license.as_str(),
                title.as_deref(),
                author.as_deref(),
                year.as_deref(),
                source.as_deref(),
                version.as_deref(),
            ),
        };

        let license = License::from_text(text);
        let version = if license.is_creative_commons() {
            let given = non_empty(version);
            Some(given.unwrap_or_else(|| {
                if license == License::CcBySa && text.contains("3.0") {
                    "3.0".into()
                } else {
                    "4.0".into()
                }
            }))
        } else {
            None
        };

        Self {
            license,
            title: non_empty(title),
            author: non_empty(author),
            year: non_empty(year),
            source: non_empty(source),
            version,
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

/// Image field as it arrives in a request: a bare path or a full record.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ImageInput {
    Path(String),
    Record(ImageRecord),
}

/// Canonical request-side image record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub mime: Option<String>,
    #[serde(default, alias = "image_alt", alias = "alt")]
    pub image_alt: String,
    #[serde(default, alias = "match_alt")]
    pub match_alt: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub copyright: Option<CopyrightInput>,
}

impl ImageInput {
    /// Collapse both input shapes into the canonical record.
    pub fn into_record(self) -> ImageRecord {
        match self {
            Self::Path(path) => ImageRecord {
                path,
                ..ImageRecord::default()
            },
            Self::Record(record) => record,
        }
    }
}

/// A resolved image inside the content tree.
///
/// The path is relative to the package's `content/` directory and must match
/// the archive entry the bytes are written to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageReference {
    pub path: String,
    pub mime: String,
    pub copyright: Copyright,
    pub width: u32,
    pub height: u32,
}

impl ImageReference {
    /// Reference with an inferred mime type and no copyright information.
    pub fn new(path: impl Into<String>) -> Self {
        let path = normalize_content_path(&path.into());
        Self {
            mime: infer_mime(&path).to_string(),
            path,
            copyright: Copyright::undisclosed(),
            width: IMAGE_DISPLAY_SIZE,
            height: IMAGE_DISPLAY_SIZE,
        }
    }

    /// Build from a request record. Returns `None` when the path is empty.
    pub fn from_record(record: &ImageRecord) -> Option<Self> {
        if record.path.trim().is_empty() {
            return None;
        }
        let mut reference = Self::new(record.path.trim());
        if let Some(mime) = record.mime.as_deref().filter(|m| !m.trim().is_empty()) {
            reference.mime = mime.trim().to_string();
        }
        if let Some(copyright) = &record.copyright {
            reference.copyright = Copyright::from_input(copyright);
        }
        Some(reference)
    }

    /// Build from either input shape. Returns `None` when the path is empty.
    pub fn from_input(input: ImageInput) -> Option<Self> {
        Self::from_record(&input.into_record())
    }

    /// Whether the path points inside the package (not an external URL).
    pub fn is_local(&self) -> bool {
        !(self.path.starts_with("http://") || self.path.starts_with("https://"))
    }
}

/// Strip `./`, leading slashes and a `content/` prefix from a package path.
pub fn normalize_content_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    let path = path.trim_start_matches("./").trim_start_matches('/');
    path.strip_prefix("content/").unwrap_or(path).to_string()
}

/// Infer an image mime type from the file extension. Defaults to PNG.
pub fn infer_mime(path: &str) -> &'static str {
    let ext = path
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => "image/png",
    }
}

// ---------------------------------------------------------------------------
// NodeMetadata
// ---------------------------------------------------------------------------

/// An author entry in node metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Author {
    pub name: String,
    pub role: String,
}

/// A change-log entry in node metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Change {
    pub date: String,
    pub author: String,
    pub log: String,
}

/// Metadata block attached to a content node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMetadata {
    pub content_type: String,
    pub license: License,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<Author>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<Change>,
}

impl NodeMetadata {
    /// Metadata for a node of `library` with an undisclosed license.
    pub fn new(library: LibraryId, title: impl Into<String>) -> Self {
        Self {
            content_type: library.content_type().to_string(),
            license: License::Undisclosed,
            title: Some(title.into()),
            authors: Vec::new(),
            changes: Vec::new(),
        }
    }
}
