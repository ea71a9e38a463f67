//! Typed entity identifiers
//!
//! Every primitive in the document is identified by a small integer drawn
//! from one document-wide monotonic counter. IDs are never reused within a
//! document's lifetime, even after deletion — external history managers rely
//! on stable identity across undo/redo.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }
    };
}

entity_id!(
    /// Identifier of a [`Pipeline`](crate::pipeline::Pipeline).
    PipelineId
);
entity_id!(
    /// Identifier of a [`Dataset`](crate::dataset::Dataset).
    DatasetId
);
entity_id!(
    /// Identifier of a [`Scale`](crate::scale::Scale).
    ScaleId
);
entity_id!(
    /// Identifier of a [`Guide`](crate::guide::Guide).
    GuideId
);
entity_id!(
    /// Identifier of a [`Mark`](crate::marks::Mark).
    MarkId
);
entity_id!(
    /// Identifier of an [`Interaction`](crate::interaction::Interaction).
    InteractionId
);
entity_id!(
    /// Identifier of a [`Widget`](crate::widget::Widget).
    WidgetId
);

/// Monotonic ID source for a document.
///
/// Lives outside the undo-able snapshot: restoring an older snapshot must
/// not rewind the counter, or freshly created entities would collide with
/// IDs recorded in history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdCounter {
    next: u64,
}

impl IdCounter {
    /// Counter starting at 1 (0 is reserved as a sentinel in test fixtures).
    #[must_use]
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Take the next ID.
    pub fn assign(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Reset for a new document.
    pub fn reset(&mut self) {
        self.next = 1;
    }

    /// Fast-forward past `id`, used when hydrating a persisted document.
    pub fn observe(&mut self, id: u64) {
        if id >= self.next {
            self.next = id + 1;
        }
    }
}

impl Default for IdCounter {
    fn default() -> Self {
        Self::new()
    }
}
