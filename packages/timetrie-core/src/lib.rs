#![forbid(unsafe_code)]
//! Time-partitioned digest trie for replica anti-entropy.
//! Each replica folds its identifier-stamped records into a trie keyed by the decimal digits of
//! their time slot; comparing two tries yields the earliest slot where the replicas disagree,
//! without shipping either record log. Transport and persistence of tries are left to the host.

pub mod branch_point;
pub mod codec;
pub mod config;
pub mod digest;
pub mod error;
pub mod record;
pub mod trie;

pub use branch_point::{branch_point, BranchPoint, Replica};
pub use codec::{Digit, TimeSlotCodec, RADIX};
pub use config::{DigitWidth, TrieConfig, DEFAULT_SEED, DEFAULT_SLOT_WIDTH_MILLIS, MAX_DIGITS};
pub use digest::{DigestFunction, Murmur3};
pub use error::{Error, Result};
pub use record::{Record, TimestampMillis};
pub use trie::{DigestTrie, NodeRef};
