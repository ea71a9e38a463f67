//! Binding resolver
//!
//! The write path from high-level chart grammar into the document model:
//! takes a fragment compiled by the external chart compiler and reconciles
//! it against the document — finding or creating datasets, aggregates, and
//! scales, and binding the mark's visual properties — through dispatched
//! actions. Resolution failures degrade to warn-and-skip; a partial bind
//! never corrupts the document.

pub mod fragment;

mod data;
mod error;
mod layout;
mod marks;
mod scales;

pub use error::BindError;
pub use fragment::{CompiledFragment, CompiledOutput, FragmentMap};

use vizier_doc::{DataRegistry, Store};

/// Integrate one compiled channel bind into the document.
///
/// The whole bind runs in a single batch: observers see either the
/// document before the bind or the fully reconciled result, never an
/// intermediate state.
///
/// # Errors
/// Only document-integrity violations (stale IDs inside the fragment)
/// escape; per-channel resolution problems are logged and skipped.
pub fn bind_channel(
    store: &mut Store,
    data: &DataRegistry,
    fragment: &mut CompiledFragment,
) -> Result<(), BindError> {
    store.begin_batch();
    let result: Result<(), BindError> = (|| {
        data::resolve_data(store, fragment)?;
        scales::resolve_scale(store, data, fragment)?;
        marks::resolve_marks(store, fragment)?;
        Ok(())
    })();
    store.end_batch();
    result
}
