//! Divergence search between two digest tries.
//!
//! Both tries are walked in lockstep from their roots. At every level the children are scanned
//! in ascending digit order, which is chronological order for most-significant-first slot
//! paths, and the walk descends into the first digit where the two sides disagree: either only
//! one side has a child there, or both do and their aggregates differ. The first disagreement
//! found this way is the earliest one, so the walk never backtracks.
//!
//! Aggregates are plain XOR folds. Two different record sets whose digests happen to cancel
//! to the same value are indistinguishable and yield [`BranchPoint::NoDivergence`].

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::codec::{Digit, RADIX};
use crate::error::{Error, Result};
use crate::record::TimestampMillis;
use crate::trie::{DigestTrie, NodeRef};

/// Which of the two compared tries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Replica {
    Left,
    Right,
}

impl Replica {
    pub fn other(self) -> Self {
        match self {
            Replica::Left => Replica::Right,
            Replica::Right => Replica::Left,
        }
    }
}

/// Outcome of comparing two tries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BranchPoint {
    /// Every aggregate compared along the walk matched.
    NoDivergence,
    /// Both replicas hold records in the slot starting at `timestamp`, with different digests.
    DivergesAt { timestamp: TimestampMillis },
    /// Only `replica` holds records from the slot starting at `timestamp`; the other replica
    /// has nothing under the diverging prefix at all.
    OneReplicaAheadAt {
        timestamp: TimestampMillis,
        replica: Replica,
    },
}

impl BranchPoint {
    /// Slot-aligned cutoff, or `None` when the tries agree.
    pub fn timestamp(&self) -> Option<TimestampMillis> {
        match *self {
            BranchPoint::NoDivergence => None,
            BranchPoint::DivergesAt { timestamp }
            | BranchPoint::OneReplicaAheadAt { timestamp, .. } => Some(timestamp),
        }
    }

    pub fn is_divergent(&self) -> bool {
        !matches!(self, BranchPoint::NoDivergence)
    }

    /// Replica holding the records the other one lacks, when only one side has any.
    pub fn ahead(&self) -> Option<Replica> {
        match *self {
            BranchPoint::OneReplicaAheadAt { replica, .. } => Some(replica),
            _ => None,
        }
    }

    /// Same outcome seen from the other side of the comparison.
    pub fn swapped(self) -> Self {
        match self {
            BranchPoint::OneReplicaAheadAt { timestamp, replica } => {
                BranchPoint::OneReplicaAheadAt {
                    timestamp,
                    replica: replica.other(),
                }
            }
            other => other,
        }
    }

    #[cfg(feature = "chrono")]
    pub fn datetime(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        let millis = i64::try_from(self.timestamp()?).ok()?;
        chrono::DateTime::from_timestamp_millis(millis)
    }
}

#[derive(Debug)]
enum Stop {
    /// Both sides present and nothing below differs further.
    Settled,
    /// Only one side has a subtree under the collected prefix.
    OneSided(Replica),
}

/// Digit at which two sibling sets first disagree, scanning `0..=9`.
fn first_divergent_digit(left: NodeRef<'_>, right: NodeRef<'_>) -> Option<Digit> {
    (0..RADIX as Digit).find(|&digit| match (left.child(digit), right.child(digit)) {
        (None, None) => false,
        (Some(l), Some(r)) => l.aggregate() != r.aggregate(),
        _ => true,
    })
}

/// Earliest slot at which `left` and `right` disagree.
///
/// Both tries must share a configuration; paths built with different slot widths or digit
/// widths do not line up and are rejected with [`Error::Config`].
pub fn branch_point<D>(left: &DigestTrie<D>, right: &DigestTrie<D>) -> Result<BranchPoint> {
    if left.config() != right.config() {
        return Err(Error::Config(format!(
            "cannot compare tries with different configurations: {:?} vs {:?}",
            left.config(),
            right.config()
        )));
    }

    let mut path: Vec<Digit> = Vec::new();
    let mut cursor = (Some(left.root()), Some(right.root()));

    let stop = loop {
        match cursor {
            (Some(l), Some(r)) => match first_divergent_digit(l, r) {
                Some(digit) => {
                    path.push(digit);
                    cursor = (l.child(digit), r.child(digit));
                }
                None => break Stop::Settled,
            },
            (Some(l), None) => {
                path.extend(l.min_path());
                break Stop::OneSided(Replica::Left);
            }
            (None, Some(r)) => {
                path.extend(r.min_path());
                break Stop::OneSided(Replica::Right);
            }
            (None, None) => break Stop::Settled,
        }
    };

    if path.is_empty() {
        tracing::debug!(
            aggregate = left.aggregate(),
            "branch point: tries agree"
        );
        return Ok(BranchPoint::NoDivergence);
    }

    let timestamp = left.codec().prefix_start(&path)?;
    let outcome = match stop {
        Stop::Settled => BranchPoint::DivergesAt { timestamp },
        Stop::OneSided(replica) => BranchPoint::OneReplicaAheadAt { timestamp, replica },
    };
    tracing::debug!(
        depth = path.len(),
        left_aggregate = left.aggregate(),
        right_aggregate = right.aggregate(),
        ?outcome,
        "branch point: tries diverge"
    );
    Ok(outcome)
}
