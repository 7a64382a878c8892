//! Build requests: the JSON document describing one book, or a markdown
//! response file carrying it in numbered fenced blocks.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use booklet_content::{CoverInput, PartNumeral};
use booklet_shared::{BookletError, Result};

/// One file to copy into the package.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AssetSource {
    /// File on disk; relative paths resolve against the request's directory.
    pub source: PathBuf,
    /// Content-relative target path. Defaults to `images/<file name>`.
    #[serde(default)]
    pub target: Option<String>,
}

impl AssetSource {
    /// Target path inside `content/`.
    pub fn target_path(&self) -> String {
        match self.target.as_deref().filter(|t| !t.trim().is_empty()) {
            Some(target) => target.trim().to_string(),
            None => {
                let name = self
                    .source
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                format!("images/{name}")
            }
        }
    }
}

/// Everything needed to build one book.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub cover: CoverInput,
    #[serde(default)]
    pub introduction_part: Option<PartNumeral>,
    /// Raw chapter records; shape checking happens during assembly.
    #[serde(default)]
    pub chapters: Vec<Value>,
    #[serde(default)]
    pub assets: Vec<AssetSource>,
    /// Directory relative asset sources resolve against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

static RESPONSE_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"## Response Block (\d+)\s*```(?:markdown|json)?\s*([\s\S]*?)\s*```")
        .expect("valid regex")
});

impl BuildRequest {
    /// Parse a JSON request document.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| BookletError::json(&e))
    }

    /// Parse a markdown file of `## Response Block N` sections.
    ///
    /// Blocks merge in numeric order, not file order. An object with
    /// `type` appends one chapter, even when it carries a `title`. Any other
    /// object with `title` or `chapters` updates the request, and an array
    /// appends several chapters. Anything else is skipped.
    pub fn from_markdown(text: &str) -> Result<Self> {
        let mut blocks: Vec<(u32, usize, &str)> = RESPONSE_BLOCK_RE
            .captures_iter(text)
            .filter_map(|caps| {
                let number = caps[1].parse().ok()?;
                let body = caps.get(2)?;
                let line = text[..body.start()].matches('\n').count();
                Some((number, line, body.as_str()))
            })
            .collect();

        if blocks.is_empty() {
            return Err(BookletError::Parse {
                message: "no response blocks found".into(),
                line: 1,
                column: 1,
            });
        }
        blocks.sort_by_key(|(number, _, _)| *number);

        let mut request = Self::default();
        for (number, line_offset, body) in blocks {
            let value: Value = serde_json::from_str(body).map_err(|e| BookletError::Parse {
                message: format!("response block {number}: {e}"),
                line: line_offset + e.line(),
                column: e.column(),
            })?;
            request.merge_block(number, value)?;
        }
        Ok(request)
    }

    fn merge_block(&mut self, number: u32, value: Value) -> Result<()> {
        let has = |key: &str| value.get(key).is_some();
        let is_chapter = value.is_object() && has("type");
        let seeds_request = value.is_object() && (has("title") || has("chapters"));

        if let Value::Array(chapters) = value {
            debug!(block = number, chapters = chapters.len(), "appending chapters");
            self.chapters.extend(chapters);
        } else if is_chapter {
            debug!(block = number, "appending chapter");
            self.chapters.push(value);
        } else if seeds_request {
            let part: BuildRequest = serde_json::from_value(value)
                .map_err(|e| BookletError::input(format!("response block {number}: {e}")))?;
            debug!(block = number, chapters = part.chapters.len(), "merging request block");
            if !part.title.trim().is_empty() {
                self.title = part.title;
            }
            let cover = &part.cover;
            if cover.title.is_some() || cover.subtitle.is_some() || cover.image.is_some() {
                self.cover = part.cover;
            }
            if part.introduction_part.is_some() {
                self.introduction_part = part.introduction_part;
            }
            self.chapters.extend(part.chapters);
            self.assets.extend(part.assets);
        } else {
            warn!(block = number, "skipping response block without request data");
        }
        Ok(())
    }

    /// Resolve an asset source against the request's directory.
    pub fn resolve_source(&self, asset: &AssetSource) -> PathBuf {
        if asset.source.is_absolute() {
            asset.source.clone()
        } else {
            self.base_dir.join(&asset.source)
        }
    }
}

/// Load a request file. `.md`/`.markdown` files are read as response blocks,
/// everything else as JSON.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_request(path: &Path) -> Result<BuildRequest> {
    let text = std::fs::read_to_string(path).map_err(|e| BookletError::io(path, e))?;

    let is_markdown = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("md") || e.eq_ignore_ascii_case("markdown"));

    let mut request = if is_markdown {
        BuildRequest::from_markdown(&text)?
    } else {
        BuildRequest::from_json(&text)?
    };
    request.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();

    info!(
        title = %request.title,
        chapters = request.chapters.len(),
        assets = request.assets.len(),
        "request loaded"
    );
    Ok(request)
}
