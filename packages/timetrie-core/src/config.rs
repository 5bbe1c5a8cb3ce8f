#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One minute, the default slot width.
pub const DEFAULT_SLOT_WIDTH_MILLIS: u64 = 60_000;

/// Seed handed to the default digest function.
pub const DEFAULT_SEED: u32 = 0;

/// Widest digit path a `u64` slot index can need.
pub const MAX_DIGITS: u8 = 20;

/// How a slot index is spelled out as trie digits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DigitWidth {
    /// Zero-padded to the number of digits of the largest slot index the slot width allows.
    ///
    /// Every path then has the same depth, so tries built by different replicas line up
    /// level by level even across decimal boundaries (slot 9 vs. slot 10).
    #[default]
    Padded,
    /// Zero-padded to exactly this many digits. Slots that need more digits are rejected.
    Fixed(u8),
    /// Unpadded decimal digits (slot 0 is the single digit `0`).
    ///
    /// Compatible with tries whose paths were built without padding, at the cost of
    /// uneven depths around powers of ten.
    Natural,
}

/// Process-wide settings fixed when a trie is constructed.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrieConfig {
    pub slot_width_millis: u64,
    pub seed: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub digit_width: DigitWidth,
}

impl Default for TrieConfig {
    fn default() -> Self {
        Self {
            slot_width_millis: DEFAULT_SLOT_WIDTH_MILLIS,
            seed: DEFAULT_SEED,
            digit_width: DigitWidth::default(),
        }
    }
}

impl TrieConfig {
    pub fn with_slot_width_millis(mut self, slot_width_millis: u64) -> Self {
        self.slot_width_millis = slot_width_millis;
        self
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_digit_width(mut self, digit_width: DigitWidth) -> Self {
        self.digit_width = digit_width;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.slot_width_millis == 0 {
            return Err(Error::Config("slot width must be positive".into()));
        }
        if let DigitWidth::Fixed(width) = self.digit_width {
            if width == 0 || width > MAX_DIGITS {
                return Err(Error::Config(format!(
                    "fixed digit width must be within 1..={MAX_DIGITS}, got {width}"
                )));
            }
        }
        Ok(())
    }
}
