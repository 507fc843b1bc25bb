//! Go version model and constraint language
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐
//! │ Constraints │────▶│  GoVersion  │
//! │ (^1.15 ...) │     │ (go1.15rc1) │
//! └─────────────┘     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`go`]: Parsing and total ordering of `goN.N.Nsuffix` versions
//! - [`constraint`]: Range constraints evaluated against Go versions
//! - [`error`]: Parse errors for versions and constraints

pub mod constraint;
pub mod error;
pub mod go;

pub use constraint::Constraints;
pub use error::{ConstraintError, VersionError};
pub use go::GoVersion;
