use std::io::Cursor;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Maps a record identifier to a fixed-width digest.
///
/// Implementations must be deterministic and must not keep per-call state: the same
/// instance may be used by every insert into a trie. Only the identifier bytes are hashed;
/// the timestamp decides where the digest lands, not what it is.
///
/// `digest` is fallible so implementations that stream identifiers through `std::io::Read`
/// (as the MurmurHash3 crate does) can report failures instead of panicking.
pub trait DigestFunction {
    fn digest(&self, id: &[u8]) -> Result<u32>;

    /// Seed the digest was keyed with, when it has one.
    ///
    /// A trie refuses a digest whose seed disagrees with its configuration, so comparing
    /// configurations is enough to know two tries hash identifiers the same way.
    fn seed(&self) -> Option<u32> {
        None
    }
}

impl<F> DigestFunction for F
where
    F: Fn(&[u8]) -> u32,
{
    fn digest(&self, id: &[u8]) -> Result<u32> {
        Ok(self(id))
    }
}

/// Seeded 32-bit MurmurHash3 (x86 variant).
///
/// Not collision resistant; aggregates built from it detect change, they do not prove integrity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Murmur3 {
    seed: u32,
}

impl Murmur3 {
    pub const fn with_seed(seed: u32) -> Self {
        Self { seed }
    }

}

impl DigestFunction for Murmur3 {
    fn digest(&self, id: &[u8]) -> Result<u32> {
        murmur3::murmur3_32(&mut Cursor::new(id), self.seed)
            .map_err(|err| Error::Digest(err.to_string()))
    }

    fn seed(&self) -> Option<u32> {
        Some(self.seed)
    }
}
