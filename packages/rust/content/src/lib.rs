//! Interactive Book content assembly.
//!
//! Turns loosely-shaped chapter records into the typed content tree of an
//! H5P Interactive Book, plus the package metadata document that goes with
//! it. Every builder here is pure apart from fresh sub-content ids and log
//! output; nothing touches the filesystem.

pub mod accordion;
pub mod assemble;
pub mod assignment;
pub mod book;
pub mod embed;
pub mod intro;
pub mod manifest;
pub mod memory;
pub mod node;
pub mod normalize;
pub mod questions;
pub mod summary;
pub mod video;

pub use assemble::{AssembleOptions, Assembly, ChapterInput, assemble_book};
pub use book::{Behaviour, Book, BookCover, CoverInput};
pub use intro::PartNumeral;
pub use manifest::PackageMetadata;
pub use node::{ColumnItem, ContentNode, Params, Separator};
pub use normalize::{eszett_to_ss, replace_eszett};
