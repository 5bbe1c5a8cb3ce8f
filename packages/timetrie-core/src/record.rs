#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Milliseconds since the Unix epoch.
pub type TimestampMillis = u64;

/// An identifier-stamped event as seen by one replica.
///
/// The trie keeps no copy of a record; only its digest survives, folded into the aggregates
/// along its slot path.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Record {
    pub id: String,
    pub timestamp: TimestampMillis,
}

impl Record {
    pub fn new(id: impl Into<String>, timestamp: TimestampMillis) -> Self {
        Self {
            id: id.into(),
            timestamp,
        }
    }
}
