//! Property tests for the signal reconciliation primitive.

use proptest::prelude::*;
use serde_json::{json, Value};
use vizier_preview::edit_signals;

fn signal_list(max: usize) -> impl Strategy<Value = Vec<Value>> {
    prop::collection::vec(("[a-e]", 0i64..100), 0..max).prop_map(|pairs| {
        let mut out: Vec<Value> = Vec::new();
        for (name, value) in pairs {
            // Signal names are unique within a list.
            if !out.iter().any(|sg| sg["name"] == json!(name)) {
                out.push(json!({"name": name, "value": value}));
            }
        }
        out
    })
}

proptest! {
    /// Applying the same incoming set twice changes nothing: no
    /// duplicates, no reordering on the second pass.
    #[test]
    fn merge_is_idempotent(existing in signal_list(6), incoming in signal_list(6)) {
        let once = edit_signals(existing, incoming.clone());
        let twice = edit_signals(once.clone(), incoming);
        prop_assert_eq!(once, twice);
    }

    /// Every incoming signal wins; every unmatched existing signal
    /// survives in place.
    #[test]
    fn merge_preserves_and_replaces(existing in signal_list(6), incoming in signal_list(6)) {
        let merged = edit_signals(existing.clone(), incoming.clone());

        for signal in &incoming {
            prop_assert!(merged.contains(signal));
        }
        for signal in &existing {
            let replaced = incoming.iter().any(|inc| inc["name"] == signal["name"]);
            if !replaced {
                prop_assert!(merged.contains(signal));
            }
        }

        // Names stay unique.
        let mut names: Vec<&str> = merged.iter().filter_map(|sg| sg["name"].as_str()).collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        prop_assert_eq!(names.len(), total);
    }
}
