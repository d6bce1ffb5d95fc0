//! Typed, order-preserving model of a JSON package manifest.

pub mod error;
pub mod manifest;
pub mod table;

pub use error::ManifestError;
pub use manifest::{DependencyKind, Manifest};
pub use table::{DependencySpec, DependencyTable};
