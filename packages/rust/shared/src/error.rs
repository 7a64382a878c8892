//! Error types for Booklet.
//!
//! Library crates use [`BookletError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all Booklet operations.
#[derive(Debug, thiserror::Error)]
pub enum BookletError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Malformed request document (JSON syntax, markdown response blocks).
    #[error("parse error at line {line}, column {column}: {message}")]
    Parse {
        message: String,
        line: usize,
        column: usize,
    },

    /// Input that parsed but has the wrong shape for its role.
    #[error("input error: {message}")]
    Input { message: String },

    /// The base template archive does not exist.
    #[error("template archive not found: {path:?}")]
    TemplateNotFound { path: PathBuf },

    /// A referenced asset is missing, either on disk or in the built package.
    #[error("asset not found: {path}")]
    AssetNotFound { path: String },

    /// Zip reading or writing failed.
    #[error("archive error: {0}")]
    Archive(String),

    /// Image decoding or encoding failed.
    #[error("image error: {0}")]
    Image(String),

    /// Data validation error.
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BookletError>;

impl BookletError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create an input-shape error from any displayable message.
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an archive error from anything displayable (usually a `ZipError`).
    pub fn archive(err: impl std::fmt::Display) -> Self {
        Self::Archive(err.to_string())
    }

    /// Create an image error from anything displayable.
    pub fn image(err: impl std::fmt::Display) -> Self {
        Self::Image(err.to_string())
    }

    /// Convert a `serde_json` error, keeping its position.
    pub fn json(err: &serde_json::Error) -> Self {
        Self::Parse {
            message: err.to_string(),
            line: err.line(),
            column: err.column(),
        }
    }

    /// Stable machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config { .. } => "config",
            Self::Io { .. } => "io",
            Self::Parse { .. } => "parse",
            Self::Input { .. } => "input",
            Self::TemplateNotFound { .. } => "template_not_found",
            Self::AssetNotFound { .. } => "asset_not_found",
            Self::Archive(_) => "archive",
            Self::Image(_) => "image",
            Self::Validation { .. } => "validation",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = BookletError::config("missing template path");
        assert_eq!(err.to_string(), "config error: missing template path");

        let err = BookletError::AssetNotFound {
            path: "images/cover.png".into(),
        };
        assert!(err.to_string().contains("images/cover.png"));
    }

    #[test]
    fn json_error_keeps_position() {
        let err = serde_json::from_str::<serde_json::Value>("{\n  \"a\": }").unwrap_err();
        let err = BookletError::json(&err);
        match err {
            BookletError::Parse { line, column, .. } => {
                assert_eq!(line, 2);
                assert!(column > 0);
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn error_kinds() {
        let err = BookletError::TemplateNotFound {
            path: "template.zip".into(),
        };
        assert_eq!(err.kind(), "template_not_found");
        assert_eq!(BookletError::input("no type").kind(), "input");
        assert_eq!(BookletError::image("bad png").kind(), "image");
    }
}
