//! Compiled address prefix.

use std::fmt;

use crate::crypto::Address;

use super::canonical::{canonicalize, PrefixError};

/// A canonicalized prefix, ready to be matched against addresses.
///
/// The wrapped string only ever holds lowercase hex digits and is at most
/// as long as an address.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Prefix {
    canonical: String,
}

impl Prefix {
    /// Canonicalizes `input` and compiles it.
    pub fn new(input: &str) -> Result<Self, PrefixError> {
        Ok(Self {
            canonical: canonicalize(input)?,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.canonical
    }

    pub fn len(&self) -> usize {
        self.canonical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.canonical.is_empty()
    }

    #[inline]
    pub fn matches(&self, address: &Address) -> bool {
        address.hex_starts_with(&self.canonical)
    }

    /// Number of equally likely prefixes of this length, `16^len`.
    ///
    /// Saturates at `u128::MAX` for prefixes of 32 digits or more.
    pub fn possible_choices(&self) -> u128 {
        16u128.saturating_pow(self.canonical.len() as u32)
    }

    pub fn difficulty_description(&self) -> &'static str {
        match self.possible_choices() {
            0..=1_000 => "Very Easy (< 1 second)",
            1_001..=100_000 => "Easy (seconds)",
            100_001..=10_000_000 => "Medium (minutes)",
            10_000_001..=1_000_000_000 => "Hard (hours)",
            _ => "Very Hard (days or more)",
        }
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}
