//! Shared types, error model, and configuration for Booklet.
//!
//! This crate is the foundation depended on by all other Booklet crates.
//! It provides:
//! - [`BookletError`], the unified error type
//! - Domain types ([`SubContentId`], [`LibraryId`], [`ImageReference`], [`Copyright`])
//! - Configuration ([`AppConfig`], [`BuildConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BookConfig, BuildConfig, DefaultsConfig, ImageBudget, ImagesConfig, QuizConfig,
    config_dir, config_file_path, init_config, load_config, load_config_from,
};
pub use error::{BookletError, Result};
pub use types::{
    Author, Change, Copyright, CopyrightInput, IMAGE_DISPLAY_SIZE, ImageInput, ImageRecord,
    ImageReference, LibraryId, License, NodeMetadata, SubContentId, infer_mime,
    normalize_content_path,
};
