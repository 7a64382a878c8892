//! Build pipeline for Booklet.
//!
//! This crate ties request loading, book assembly, image normalization and
//! package writing into end-to-end workflows (`build_package`, `run_batch`).

pub mod batch;
pub mod input;
pub mod pipeline;

pub use batch::{BatchItem, BatchSummary, run_batch};
pub use input::{AssetSource, BuildRequest, load_request};
pub use pipeline::{
    BuildResult, ProgressReporter, SilentProgress, build_package, output_file_name, write_package,
};
