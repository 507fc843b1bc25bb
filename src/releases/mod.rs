//! Go release catalog assembly
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ StorageClient│────▶│   filename   │────▶│   assembler  │
//! │   (listing)  │     │  (classify)  │     │ (group/sort) │
//! └──────────────┘     └──────────────┘     └──────────────┘
//!        │                    │                    ▲
//!        ▼                    ▼                    │
//! ┌──────────────┐     ┌──────────────┐            │
//! │ GolangDlFeed │────▶│   checksum   │────────────┘
//! │    (feed)    │     │ (worker pool)│
//! └──────────────┘     └──────────────┘
//! ```
//!
//! # Modules
//!
//! - [`fetch`]: Entry point wiring the stages together
//! - [`source`]: Traits for the upstream sources
//! - [`sources`]: HTTP implementations (storage bucket, golang.org/dl feed)
//! - [`filename`]: Release file name classification
//! - [`assembler`]: Grouping and deterministic ordering
//! - [`checksum`]: Checksum resolution with a bounded worker pool
//! - [`catalog`]: Catalog JSON files
//! - [`conflicts`]: Merge conflict detection between catalog snapshots
//! - [`types`]: Catalog and listing types
//! - [`error`]: Error types

pub mod assembler;
pub mod catalog;
pub mod checksum;
pub mod conflicts;
pub mod error;
pub mod fetch;
pub mod filename;
pub mod source;
pub mod sources;
pub mod types;

pub use catalog::{load_catalog, write_catalog};
pub use conflicts::{ConflictReport, check_conflict_files, find_conflicts};
pub use error::{CatalogFileError, ClassificationError, FetchError, UpstreamError};
pub use fetch::{FetchOptions, fetch_releases};
pub use types::{FeedFile, FeedRelease, FileKind, Release, ReleaseFile, StorageObject};
