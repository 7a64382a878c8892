//! H5P package writing and image size normalization.
//!
//! [`package`] merges generated documents and assets into a base template
//! archive; [`images`] shrinks oversized pictures before they are packaged.

pub mod images;
pub mod package;

pub use images::normalize_image;
pub use package::{
    Asset, CONTENT_DIR, CONTENT_DOCUMENT_PATH, METADATA_DOCUMENT_PATH, Package, PackageManifest,
    build_package, build_package_from_path, content_entry_path,
};
