//! Demonstration/preview engine
//!
//! Synthesizes interaction scaffolding over *exported* specifications:
//! selection signal networks, application rewrites, and preview-sized spec
//! cleaning. Everything here is a pure tree-rewrite over
//! [`serde_json::Value`] — the committed document is never touched, so a
//! preview can be discarded without a trace.

pub mod application;
pub mod scaffold;
pub mod scale_info;
pub mod selection;
pub mod signals;

mod util;

pub use application::add_application_to_scene;
pub use scaffold::{demonstration_datasets, demonstrations};
pub use scale_info::get_scale_info_for_group;
pub use selection::add_selection_to_scene;
pub use signals::{clean_spec_for_preview, edit_signals};

/// Name of the interval-selection backing store for a group.
#[must_use]
pub fn brush_store(group_name: &str) -> String {
    format!("brush_store_{group_name}")
}

/// Name of the pan/zoom backing store for a group.
#[must_use]
pub fn grid_store(group_name: &str) -> String {
    format!("grid_store_{group_name}")
}

/// Name of the point-selection backing store for a group.
#[must_use]
pub fn points_store(group_name: &str) -> String {
    format!("points_store_{group_name}")
}

/// Selection test expression that passes everything while the store is
/// empty — an unresolved interaction must never empty the view.
#[must_use]
pub fn selection_test(store: &str) -> String {
    format!("!(length(data(\"{store}\"))) || (vlSelectionTest(\"{store}\", datum))")
}
