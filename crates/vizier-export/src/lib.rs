//! Specification exporter
//!
//! The read path from the document model: deterministically serializes a
//! snapshot into a complete executable visualization specification,
//! resolving internal references, counting usage, and — for the editor's
//! own view — injecting direct-manipulation scaffolding.

pub mod clean;
pub mod counts;
pub mod error;
pub mod exporter;
pub mod manipulators;

mod data_ref;

pub use clean::clean;
pub use counts::{Counts, DataCount, ScaleCount};
pub use error::ExportError;
pub use exporter::{export, ExportedSpec};
pub use manipulators::manipulators;
