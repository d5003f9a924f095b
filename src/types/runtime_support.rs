//! Auxiliary crates a set of resolved types needs at emit time

use std::collections::BTreeSet;

use serde::Serialize;

use crate::model::Column;

/// Capability tag the emitter turns into imports / dependencies
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeSupport {
    /// `uuid::Uuid`
    Uuid,
    /// Arbitrary-precision numerics (`rust_decimal`)
    Decimal,
    /// Date/time values (`chrono`, interval types)
    Time,
    /// `serde_json::Value`
    Json,
    /// `ipnetwork`
    Network,
}

const MARKERS: &[(&str, RuntimeSupport)] = &[
    ("uuid::", RuntimeSupport::Uuid),
    ("rust_decimal::", RuntimeSupport::Decimal),
    ("chrono::", RuntimeSupport::Time),
    ("PgInterval", RuntimeSupport::Time),
    ("PgTimeTz", RuntimeSupport::Time),
    ("serde_json::", RuntimeSupport::Json),
    ("ipnetwork::", RuntimeSupport::Network),
];

/// Collect capability tags from resolved type descriptors
///
/// Markers are matched inside the already-wrapped descriptor, so
/// `Option<Vec<uuid::Uuid>>` still reports [`RuntimeSupport::Uuid`].
pub fn required_runtime_support_for_types<'a>(
    resolved_types: impl IntoIterator<Item = &'a str>,
) -> BTreeSet<RuntimeSupport> {
    let mut tags = BTreeSet::new();
    for resolved in resolved_types {
        for (marker, tag) in MARKERS {
            if resolved.contains(marker) {
                tags.insert(*tag);
            }
        }
    }
    tags
}

pub fn required_runtime_support(columns: &[Column]) -> BTreeSet<RuntimeSupport> {
    required_runtime_support_for_types(columns.iter().map(|c| c.resolved_type.as_str()))
}
