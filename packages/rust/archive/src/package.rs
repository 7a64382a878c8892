//! Package builder: merges generated documents and assets into a template.
//!
//! The template archive carries the H5P libraries. Its entries are copied
//! raw (compressed bytes passed through), except the two generated documents
//! and any entry an extra asset replaces. The whole package is built in
//! memory; on any failure nothing is returned and nothing is written.

use std::collections::HashSet;
use std::io::{Cursor, Write};
use std::path::Path;

use tracing::{debug, info, instrument, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use booklet_shared::{BookletError, Result, normalize_content_path};

/// Entry path of the content document.
pub const CONTENT_DOCUMENT_PATH: &str = "content/content.json";
/// Entry path of the package metadata document.
pub const METADATA_DOCUMENT_PATH: &str = "h5p.json";
/// Directory all content assets live under.
pub const CONTENT_DIR: &str = "content/";

/// Entry path for a content-relative asset path (`images/a.png` becomes
/// `content/images/a.png`; an existing `content/` prefix is not doubled).
pub fn content_entry_path(path: &str) -> String {
    format!("{CONTENT_DIR}{}", normalize_content_path(path))
}

/// One extra file to place in the package.
#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    /// Full entry path, always under `content/`.
    pub path: String,
    pub data: Vec<u8>,
}

impl Asset {
    pub fn new(path: &str, data: Vec<u8>) -> Self {
        Self {
            path: content_entry_path(path),
            data,
        }
    }
}

/// Everything the builder writes on top of the template.
#[derive(Debug, Clone, Default)]
pub struct PackageManifest {
    pub content_document: Vec<u8>,
    pub metadata_document: Vec<u8>,
    pub assets: Vec<Asset>,
    /// Content-relative paths that must exist in the finished package.
    pub required_assets: Vec<String>,
}

/// A finished package.
#[derive(Debug, Clone)]
pub struct Package {
    pub bytes: Vec<u8>,
    /// Entry names in write order.
    pub entries: Vec<String>,
}

impl Package {
    /// Whether the package holds an entry for the content-relative `path`.
    pub fn contains_asset(&self, path: &str) -> bool {
        let wanted = content_entry_path(path);
        self.entries.iter().any(|e| *e == wanted)
    }
}

fn is_generated_document(name: &str) -> bool {
    name.eq_ignore_ascii_case(CONTENT_DOCUMENT_PATH) || name.eq_ignore_ascii_case(METADATA_DOCUMENT_PATH)
}

/// Collapse assets that target the same entry. The last one wins.
fn dedup_assets(assets: &[Asset]) -> Vec<&Asset> {
    let mut unique: Vec<&Asset> = Vec::with_capacity(assets.len());
    for asset in assets {
        match unique.iter().position(|a| a.path == asset.path) {
            Some(i) => {
                warn!(path = %asset.path, "duplicate asset target, keeping the last one");
                unique[i] = asset;
            }
            None => unique.push(asset),
        }
    }
    unique
}

/// Build a package from template bytes.
#[instrument(skip_all, fields(template_bytes = template.len(), assets = manifest.assets.len()))]
pub fn build_package(template: &[u8], manifest: &PackageManifest) -> Result<Package> {
    let mut archive = ZipArchive::new(Cursor::new(template)).map_err(BookletError::archive)?;

    let assets = dedup_assets(&manifest.assets);
    let replaced: HashSet<String> = assets
        .iter()
        .map(|a| normalize_content_path(&a.path))
        .collect();

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut entries: Vec<String> = Vec::with_capacity(archive.len() + assets.len() + 2);

    // 1. Template entries, raw
    for i in 0..archive.len() {
        let entry = archive.by_index_raw(i).map_err(BookletError::archive)?;
        let name = entry.name().to_string();
        if is_generated_document(&name) {
            debug!(entry = %name, "dropping template document");
            continue;
        }
        if replaced.contains(&normalize_content_path(&name)) {
            debug!(entry = %name, "template entry replaced by asset");
            continue;
        }
        zip.raw_copy_file(entry).map_err(BookletError::archive)?;
        entries.push(name);
    }
    let template_entries = entries.len();

    // 2. Generated documents
    for (name, data) in [
        (CONTENT_DOCUMENT_PATH, &manifest.content_document),
        (METADATA_DOCUMENT_PATH, &manifest.metadata_document),
    ] {
        zip.start_file(name, deflated).map_err(BookletError::archive)?;
        zip.write_all(data).map_err(BookletError::archive)?;
        entries.push(name.to_string());
    }

    // 3. Assets
    for asset in &assets {
        zip.start_file(asset.path.as_str(), deflated)
            .map_err(BookletError::archive)?;
        zip.write_all(&asset.data).map_err(BookletError::archive)?;
        debug!(entry = %asset.path, bytes = asset.data.len(), "wrote asset");
        entries.push(asset.path.clone());
    }

    let bytes = zip.finish().map_err(BookletError::archive)?.into_inner();

    let package = Package { bytes, entries };
    for required in &manifest.required_assets {
        if !package.contains_asset(required) {
            return Err(BookletError::AssetNotFound {
                path: content_entry_path(required),
            });
        }
    }

    info!(
        entries = package.entries.len(),
        template_entries,
        bytes = package.bytes.len(),
        "package built"
    );
    Ok(package)
}

/// Build a package from a template file on disk.
pub fn build_package_from_path(template_path: &Path, manifest: &PackageManifest) -> Result<Package> {
    if !template_path.is_file() {
        return Err(BookletError::TemplateNotFound {
            path: template_path.to_path_buf(),
        });
    }
    let template = std::fs::read(template_path).map_err(|e| BookletError::io(template_path, e))?;
    build_package(&template, manifest)
}
