//! Structural walker: scrub every string leaf of a JSON tree.
//!
//! The output has exactly the shape of the input. Objects keep their keys and
//! insertion order, arrays keep their length and order, and only string
//! leaves change. Object keys are structure and are not scrubbed.

use crate::scrub::{ScrubReport, Scrubber};
use serde_json::Value;

/// Scrub every string leaf of `value`.
pub fn walk(value: Value, scrubber: &Scrubber) -> Value {
    let mut report = ScrubReport::new();
    walk_counting(value, scrubber, &mut report)
}

/// Scrub every string leaf of `value` and report replacement counts.
pub fn walk_with_report(value: Value, scrubber: &Scrubber) -> (Value, ScrubReport) {
    let mut report = ScrubReport::new();
    let value = walk_counting(value, scrubber, &mut report);
    (value, report)
}

pub(crate) fn walk_counting(value: Value, scrubber: &Scrubber, report: &mut ScrubReport) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, child)| (key, walk_counting(child, scrubber, report)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|child| walk_counting(child, scrubber, report))
                .collect(),
        ),
        Value::String(text) => Value::String(scrubber.scrub_counting(&text, report)),
        scalar @ (Value::Number(_) | Value::Bool(_) | Value::Null) => scalar,
    }
}
