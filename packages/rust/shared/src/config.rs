//! Application configuration for Booklet.
//!
//! User config lives at `~/.booklet/booklet.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BookletError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "booklet.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".booklet";

// ---------------------------------------------------------------------------
// Config structs (matching booklet.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Book presentation settings.
    #[serde(default)]
    pub book: BookConfig,

    /// Question-set settings.
    #[serde(default)]
    pub quiz: QuizConfig,

    /// Image size budget.
    #[serde(default)]
    pub images: ImagesConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Base template archive the packages are merged into.
    #[serde(default = "default_template_path")]
    pub template_path: String,

    /// Directory that receives built `.h5p` files.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            template_path: default_template_path(),
            output_dir: default_output_dir(),
        }
    }
}

fn default_template_path() -> String {
    "templates/template.h5p".into()
}
fn default_output_dir() -> String {
    ".".into()
}

/// `[book]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookConfig {
    /// Accent color of the book chrome.
    #[serde(default = "default_base_color")]
    pub base_color: String,

    /// Open the table of contents by default.
    #[serde(default)]
    pub table_of_contents: bool,

    /// Cover image used when a request names none.
    #[serde(default = "default_cover_image")]
    pub cover_image: String,

    /// Replacement for the built-in introduction text. `{part}` is substituted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intro_template: Option<String>,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            base_color: default_base_color(),
            table_of_contents: false,
            cover_image: default_cover_image(),
            intro_template: None,
        }
    }
}

fn default_base_color() -> String {
    "#002f6c".into()
}
fn default_cover_image() -> String {
    "images/default_cover.png".into()
}

/// `[quiz]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizConfig {
    /// Number of questions drawn per quiz attempt.
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,

    /// Score needed to pass, in percent.
    #[serde(default = "default_pass_percentage")]
    pub pass_percentage: u8,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            pool_size: default_pool_size(),
            pass_percentage: default_pass_percentage(),
        }
    }
}

fn default_pool_size() -> usize {
    5
}
fn default_pass_percentage() -> u8 {
    50
}

/// `[images]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagesConfig {
    /// Images at or below this size are left alone.
    #[serde(default = "default_threshold_kb")]
    pub threshold_kb: usize,

    /// Size the normalizer shrinks towards.
    #[serde(default = "default_target_kb")]
    pub target_kb: usize,

    /// Neither side is shrunk below this many pixels.
    #[serde(default = "default_min_dimension")]
    pub min_dimension: u32,

    /// Upper bound on encode/resize rounds.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// JPEG re-encode quality (1-100).
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            threshold_kb: default_threshold_kb(),
            target_kb: default_target_kb(),
            min_dimension: default_min_dimension(),
            max_iterations: default_max_iterations(),
            jpeg_quality: default_jpeg_quality(),
        }
    }
}

fn default_threshold_kb() -> usize {
    1024
}
fn default_target_kb() -> usize {
    500
}
fn default_min_dimension() -> u32 {
    300
}
fn default_max_iterations() -> u32 {
    10
}
fn default_jpeg_quality() -> u8 {
    85
}

// ---------------------------------------------------------------------------
// Build config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Byte budget and shrink policy for injected images.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBudget {
    pub threshold_bytes: usize,
    pub target_bytes: usize,
    pub min_dimension: u32,
    pub max_iterations: u32,
    /// Factor applied to both sides per round.
    pub scale: f32,
    pub jpeg_quality: u8,
}

impl Default for ImageBudget {
    fn default() -> Self {
        Self::from(&ImagesConfig::default())
    }
}

impl From<&ImagesConfig> for ImageBudget {
    fn from(config: &ImagesConfig) -> Self {
        Self {
            threshold_bytes: config.threshold_kb * 1024,
            target_bytes: config.target_kb * 1024,
            min_dimension: config.min_dimension,
            max_iterations: config.max_iterations,
            scale: 0.9,
            jpeg_quality: config.jpeg_quality.clamp(1, 100),
        }
    }
}

/// Runtime build configuration, merged from config file and CLI flags.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Template archive to merge into.
    pub template_path: PathBuf,
    /// Directory for output packages.
    pub output_dir: PathBuf,
    /// Book accent color.
    pub base_color: String,
    /// Whether the table of contents starts open.
    pub table_of_contents: bool,
    /// Fallback cover image path (inside `content/`).
    pub cover_image: String,
    /// Override for the built-in introduction text.
    pub intro_template: Option<String>,
    /// Forced question pool for quiz chapters.
    pub quiz_pool_size: usize,
    /// Quiz pass threshold in percent.
    pub pass_percentage: u8,
    /// Image normalization budget.
    pub images: ImageBudget,
}

impl From<&AppConfig> for BuildConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            template_path: PathBuf::from(&config.defaults.template_path),
            output_dir: PathBuf::from(&config.defaults.output_dir),
            base_color: config.book.base_color.clone(),
            table_of_contents: config.book.table_of_contents,
            cover_image: config.book.cover_image.clone(),
            intro_template: config.book.intro_template.clone(),
            quiz_pool_size: config.quiz.pool_size,
            pass_percentage: config.quiz.pass_percentage.min(100),
            images: ImageBudget::from(&config.images),
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.booklet/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| BookletError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.booklet/booklet.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| BookletError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| BookletError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| BookletError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| BookletError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| BookletError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("template_path"));
        assert!(toml_str.contains("#002f6c"));
        assert!(!toml_str.contains("intro_template"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.quiz.pool_size, 5);
        assert_eq!(parsed.images.target_kb, 500);
        assert_eq!(parsed.book.cover_image, "images/default_cover.png");
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r##"
[book]
base_color = "#aa0000"
intro_template = "Teil {part}"

[images]
jpeg_quality = 70
"##;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.book.base_color, "#aa0000");
        assert_eq!(config.book.intro_template.as_deref(), Some("Teil {part}"));
        assert_eq!(config.images.jpeg_quality, 70);
        assert_eq!(config.images.threshold_kb, 1024);
        assert_eq!(config.defaults.template_path, "templates/template.h5p");
    }

    #[test]
    fn build_config_from_app_config() {
        let app = AppConfig::default();
        let build = BuildConfig::from(&app);
        assert_eq!(build.quiz_pool_size, 5);
        assert_eq!(build.pass_percentage, 50);
        assert_eq!(build.images.threshold_bytes, 1024 * 1024);
        assert_eq!(build.images.target_bytes, 500 * 1024);
        assert_eq!(build.images.min_dimension, 300);
        assert_eq!(build.images.max_iterations, 10);
        assert!((build.images.scale - 0.9).abs() < f32::EPSILON);
    }

    #[test]
    fn load_config_from_missing_file_fails() {
        let path = std::env::temp_dir().join(format!(
            "booklet-config-missing-{}.toml",
            uuid::Uuid::new_v4()
        ));
        let err = load_config_from(&path).unwrap_err();
        assert_eq!(err.kind(), "io");
    }
}
