//! Time bucketing: timestamps become slot indices, slot indices become digit paths.
//!
//! A digit path is the base-10, most-significant-first spelling of a slot index. Because the
//! digits are positional, ascending digit order at any trie level is also chronological order.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::{DigitWidth, TrieConfig, MAX_DIGITS};
use crate::error::{Error, Result};

/// Number of children a trie node can have.
pub const RADIX: usize = 10;

/// A single trie-indexing digit, always `0..=9`.
pub type Digit = u8;

fn decimal_len(mut n: u64) -> usize {
    let mut len = 1;
    while n >= RADIX as u64 {
        n /= RADIX as u64;
        len += 1;
    }
    len
}

/// Converts between timestamps (milliseconds), slot indices and digit paths.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimeSlotCodec {
    slot_width: u64,
    /// `None` spells slots with their natural digit count.
    width: Option<usize>,
}

impl TimeSlotCodec {
    pub fn new(slot_width_millis: u64, digit_width: DigitWidth) -> Result<Self> {
        TrieConfig {
            slot_width_millis,
            digit_width,
            ..TrieConfig::default()
        }
        .validate()?;

        let width = match digit_width {
            DigitWidth::Padded => Some(decimal_len(u64::MAX / slot_width_millis)),
            DigitWidth::Fixed(width) => Some(width as usize),
            DigitWidth::Natural => None,
        };
        debug_assert!(width.map_or(true, |w| w <= MAX_DIGITS as usize));

        Ok(Self {
            slot_width: slot_width_millis,
            width,
        })
    }

    pub fn from_config(config: &TrieConfig) -> Result<Self> {
        Self::new(config.slot_width_millis, config.digit_width)
    }

    pub fn slot_width_millis(&self) -> u64 {
        self.slot_width
    }

    /// Path length every slot is padded to, or `None` for natural-width paths.
    pub fn width(&self) -> Option<usize> {
        self.width
    }

    /// `floor(timestamp / slot_width)`.
    pub fn slot_of(&self, timestamp_millis: u64) -> u64 {
        timestamp_millis / self.slot_width
    }

    /// Digit path of the slot containing `timestamp_millis`.
    pub fn to_digits(&self, timestamp_millis: u64) -> Result<Vec<Digit>> {
        self.slot_digits(self.slot_of(timestamp_millis))
    }

    pub fn slot_digits(&self, slot: u64) -> Result<Vec<Digit>> {
        let mut digits = Vec::with_capacity(self.width.unwrap_or_else(|| decimal_len(slot)));
        let mut rest = slot;
        loop {
            digits.push((rest % RADIX as u64) as Digit);
            rest /= RADIX as u64;
            if rest == 0 {
                break;
            }
        }

        if let Some(width) = self.width {
            if digits.len() > width {
                return Err(Error::Config(format!(
                    "slot index {slot} does not fit in {width} digits"
                )));
            }
            digits.resize(width, 0);
        }

        digits.reverse();
        Ok(digits)
    }

    /// Positional decimal evaluation of a digit path.
    pub fn from_digits(&self, digits: &[Digit]) -> Result<u64> {
        digits.iter().try_fold(0u64, |acc, &digit| {
            if digit as usize >= RADIX {
                return Err(Error::Decode(format!("digit {digit} is out of range")));
            }
            acc.checked_mul(RADIX as u64)
                .and_then(|acc| acc.checked_add(digit as u64))
                .ok_or_else(|| Error::Decode("digit path overflows a slot index".into()))
        })
    }

    /// First millisecond of `slot`. Sub-slot precision is not recoverable.
    pub fn slot_start(&self, slot: u64) -> Result<u64> {
        slot.checked_mul(self.slot_width)
            .ok_or_else(|| Error::Decode(format!("slot index {slot} overflows a timestamp")))
    }

    /// First millisecond of the earliest slot whose path starts with `prefix`.
    ///
    /// With padded paths a partial prefix is completed with zeros; natural-width prefixes are
    /// read as-is since every prefix is itself a complete path.
    pub fn prefix_start(&self, prefix: &[Digit]) -> Result<u64> {
        let slot = self.from_digits(prefix)?;
        let slot = match self.width {
            Some(width) if prefix.len() > width => {
                return Err(Error::Decode(format!(
                    "digit path of length {} exceeds width {width}",
                    prefix.len()
                )));
            }
            Some(width) => (prefix.len()..width).try_fold(slot, |acc, _| {
                acc.checked_mul(RADIX as u64)
                    .ok_or_else(|| Error::Decode("digit path overflows a slot index".into()))
            })?,
            None => slot,
        };
        self.slot_start(slot)
    }
}
