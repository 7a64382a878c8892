//! End-to-end build pipeline: request → assets → book → package.

use std::path::Path;
use std::time::{Duration, Instant};

use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument, warn};

use booklet_archive::{Asset, PackageManifest, build_package_from_path, normalize_image};
use booklet_content::{AssembleOptions, Behaviour, PackageMetadata, assemble_book, eszett_to_ss};
use booklet_shared::{BookletError, BuildConfig, ImageBudget, ImageReference, Result};

use crate::input::BuildRequest;

/// Title used when a request has none.
pub const DEFAULT_BOOK_TITLE: &str = "Interactive Book";

/// Result of [`build_package`].
#[derive(Debug)]
pub struct BuildResult {
    /// The finished `.h5p` archive.
    pub bytes: Vec<u8>,
    /// Hex SHA-256 of `bytes`.
    pub sha256: String,
    /// Suggested output file name.
    pub file_name: String,
    /// Chapters in the book, including an inserted introduction.
    pub chapter_count: usize,
    /// Chapter records that produced a chapter.
    pub processed: usize,
    /// Chapter records that were skipped.
    pub skipped: usize,
    /// Assets written on top of the template.
    pub asset_count: usize,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each asset is read and normalized.
    fn asset_loaded(&self, path: &str, current: usize, total: usize);
    /// Called when the pipeline completes.
    fn done(&self, result: &BuildResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn asset_loaded(&self, _path: &str, _current: usize, _total: usize) {}
    fn done(&self, _result: &BuildResult) {}
}

/// Output file name for a book title: alphanumerics, spaces, `-` and `_`
/// kept, whitespace runs collapsed to `_`, `.h5p` appended.
pub fn output_file_name(title: &str) -> String {
    let kept: String = title
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();
    let stem = kept.split_whitespace().collect::<Vec<_>>().join("_");
    if stem.is_empty() {
        "interactive_book.h5p".into()
    } else {
        format!("{stem}.h5p")
    }
}

fn is_image_path(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    [".png", ".jpg", ".jpeg"].iter().any(|ext| lower.ends_with(ext))
}

/// Read every asset of the request, shrinking images to the budget.
fn load_assets(
    request: &BuildRequest,
    budget: &ImageBudget,
    progress: &dyn ProgressReporter,
) -> Result<Vec<Asset>> {
    let total = request.assets.len();
    let mut assets = Vec::with_capacity(total);

    for (i, source) in request.assets.iter().enumerate() {
        let path = request.resolve_source(source);
        if !path.is_file() {
            return Err(BookletError::AssetNotFound {
                path: path.display().to_string(),
            });
        }
        let data = std::fs::read(&path).map_err(|e| BookletError::io(&path, e))?;

        // Same spelling pass as the document, so references keep resolving.
        let target = eszett_to_ss(&source.target_path());
        let data = if is_image_path(&target) {
            normalize_image(data, &target, budget)
        } else {
            data
        };
        debug!(source = %path.display(), %target, bytes = data.len(), "asset loaded");

        progress.asset_loaded(&target, i + 1, total);
        assets.push(Asset::new(&target, data));
    }

    Ok(assets)
}

fn assemble_options(config: &BuildConfig, request: &BuildRequest) -> AssembleOptions {
    let title = if request.title.trim().is_empty() {
        DEFAULT_BOOK_TITLE.to_string()
    } else {
        request.title.trim().to_string()
    };

    AssembleOptions {
        title,
        cover: request.cover.clone(),
        default_cover_image: config.cover_image.clone(),
        intro_part: request.introduction_part.clone(),
        intro_template: config.intro_template.clone(),
        behaviour: Behaviour {
            base_color: config.base_color.clone(),
            default_table_of_contents: config.table_of_contents,
            ..Behaviour::default()
        },
        quiz_pool_size: config.quiz_pool_size,
        pass_percentage: config.pass_percentage,
    }
}

/// Run the full build pipeline.
///
/// 1. Read and normalize assets
/// 2. Assemble the book and run the text normalization pass
/// 3. Serialize the content and metadata documents
/// 4. Merge everything into the template archive
#[instrument(skip_all, fields(title = %request.title, chapters = request.chapters.len()))]
pub fn build_package(
    config: &BuildConfig,
    request: &BuildRequest,
    progress: &dyn ProgressReporter,
) -> Result<BuildResult> {
    let start = Instant::now();
    info!(template = %config.template_path.display(), "starting build");

    // --- Phase 1: Assets ---
    progress.phase("Loading assets");
    let assets = load_assets(request, &config.images, progress)?;

    // --- Phase 2: Assemble ---
    progress.phase("Assembling book");
    let options = assemble_options(config, request);
    let assembly = assemble_book(&request.chapters, &options);

    let document = assembly.book.to_document()?;
    let content_document =
        serde_json::to_vec(&document).map_err(|e| BookletError::validation(e.to_string()))?;
    let metadata = PackageMetadata::for_book(&options.title, &assembly.book);
    let metadata_document =
        serde_json::to_vec_pretty(&metadata).map_err(|e| BookletError::validation(e.to_string()))?;

    // --- Phase 3: Package ---
    progress.phase("Writing package");
    let required_assets: Vec<String> = assembly
        .book
        .book_cover
        .image()
        .filter(|image| image.is_local())
        .map(|image| eszett_to_ss(&image.path))
        .into_iter()
        .collect();

    let manifest = PackageManifest {
        content_document,
        metadata_document,
        assets,
        required_assets,
    };
    let package = build_package_from_path(&config.template_path, &manifest)?;

    for path in assembly.book.image_paths().iter().map(|p| eszett_to_ss(p)) {
        let local = ImageReference::new(path.as_str()).is_local();
        if local && !package.contains_asset(&path) {
            warn!(%path, "referenced image is not in the package");
        }
    }

    let sha256 = format!("{:x}", Sha256::digest(&package.bytes));

    let result = BuildResult {
        bytes: package.bytes,
        sha256,
        file_name: output_file_name(&options.title),
        chapter_count: assembly.book.chapters.len(),
        processed: assembly.processed,
        skipped: assembly.skipped,
        asset_count: manifest.assets.len(),
        elapsed: start.elapsed(),
    };

    info!(
        chapters = result.chapter_count,
        skipped = result.skipped,
        bytes = result.bytes.len(),
        elapsed_ms = result.elapsed.as_millis() as u64,
        "build complete"
    );

    progress.done(&result);
    Ok(result)
}

/// Write a built package, creating parent directories as needed.
pub fn write_package(result: &BuildResult, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| BookletError::io(parent, e))?;
    }
    std::fs::write(path, &result.bytes).map_err(|e| BookletError::io(path, e))?;
    info!(path = %path.display(), sha256 = %result.sha256, "package written");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
