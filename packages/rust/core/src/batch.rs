//! Batch builds: every request file in a folder becomes a package beside it.

use std::path::{Path, PathBuf};

use tracing::{error, info, instrument};

use booklet_shared::{BookletError, BuildConfig, Result};

use crate::input::load_request;
use crate::pipeline::{ProgressReporter, build_package, write_package};

/// Outcome for one request file.
#[derive(Debug)]
pub struct BatchItem {
    pub request: PathBuf,
    /// Written package, on success.
    pub output: Option<PathBuf>,
    /// Error message, on failure.
    pub error: Option<String>,
}

/// Outcome of a whole batch.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub items: Vec<BatchItem>,
}

impl BatchSummary {
    pub fn succeeded(&self) -> usize {
        self.items.iter().filter(|i| i.error.is_none()).count()
    }

    pub fn failed(&self) -> usize {
        self.items.len() - self.succeeded()
    }
}

fn is_request_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| matches!(e.to_ascii_lowercase().as_str(), "json" | "md"))
}

/// Request files in `dir`, sorted by name.
pub fn find_requests(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| BookletError::io(dir, e))?;
    let mut requests: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| is_request_file(path))
        .collect();
    requests.sort();
    Ok(requests)
}

fn build_one(config: &BuildConfig, request_path: &Path, progress: &dyn ProgressReporter) -> Result<PathBuf> {
    let request = load_request(request_path)?;
    let result = build_package(config, &request, progress)?;
    let output = request_path.with_extension("h5p");
    write_package(&result, &output)?;
    Ok(output)
}

/// Build every `.json`/`.md` request in `dir`, writing `<stem>.h5p` beside
/// each. A failing request is recorded and the batch moves on.
#[instrument(skip_all, fields(dir = %dir.display()))]
pub fn run_batch(
    config: &BuildConfig,
    dir: &Path,
    progress: &dyn ProgressReporter,
) -> Result<BatchSummary> {
    let requests = find_requests(dir)?;
    info!(requests = requests.len(), "starting batch");

    let mut summary = BatchSummary::default();
    for request in requests {
        progress.phase(&format!("Building {}", request.display()));
        let item = match build_one(config, &request, progress) {
            Ok(output) => BatchItem {
                request,
                output: Some(output),
                error: None,
            },
            Err(e) => {
                error!(request = %request.display(), kind = e.kind(), error = %e, "request failed");
                BatchItem {
                    request,
                    output: None,
                    error: Some(e.to_string()),
                }
            }
        };
        summary.items.push(item);
    }

    info!(
        succeeded = summary.succeeded(),
        failed = summary.failed(),
        "batch complete"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::SilentProgress;
    use crate::pipeline::tests::{make_config, temp_dir};

    #[test]
    fn builds_every_request_and_continues_after_failures() {
        let tmp = temp_dir();
        let config = make_config(&tmp);

        let requests = tmp.join("requests");
        std::fs::create_dir_all(&requests).unwrap();
        std::fs::write(requests.join("a.json"), r#"{"title": "Erstes Buch"}"#).unwrap();
        std::fs::write(
            requests.join("b.md"),
            "## Response Block 1\n```json\n{\"title\": \"Zweites Buch\"}\n```\n",
        )
        .unwrap();
        std::fs::write(requests.join("c.json"), "{ not json").unwrap();
        std::fs::write(requests.join("notes.txt"), "ignored").unwrap();

        let summary = run_batch(&config, &requests, &SilentProgress).unwrap();
        assert_eq!(summary.items.len(), 3);
        assert_eq!(summary.succeeded(), 2);
        assert_eq!(summary.failed(), 1);

        assert!(requests.join("a.h5p").is_file());
        assert!(requests.join("b.h5p").is_file());
        assert!(!requests.join("c.h5p").exists());
        assert!(summary.items[2].error.as_deref().unwrap().contains("parse error"));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let err = run_batch(
            &BuildConfig::default(),
            Path::new("/definitely/not/a/dir"),
            &crate::pipeline::SilentProgress,
        )
        .unwrap_err();
        assert_eq!(err.kind(), "io");
    }
}
