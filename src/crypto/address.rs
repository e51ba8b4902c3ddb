//! Ethereum address representation.

use std::fmt;

use tiny_keccak::{Hasher, Keccak};

/// Number of hex digits in a rendered address.
pub const ADDRESS_HEX_LEN: usize = 40;

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// An Ethereum address (20 bytes).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; 20]);

impl Address {
    #[inline]
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    #[inline]
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Lowercase hex, no `0x`.
    #[inline]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn to_hex_prefixed(&self) -> String {
        format!("0x{}", self.to_hex())
    }

    /// Tests whether the lowercase hex rendering starts with `prefix`.
    ///
    /// Compares nibble by nibble so the hot loop never allocates the full
    /// hex string. `prefix` must already be lowercase ASCII hex.
    #[inline]
    pub fn hex_starts_with(&self, prefix: &str) -> bool {
        if prefix.len() > ADDRESS_HEX_LEN {
            return false;
        }

        prefix.bytes().enumerate().all(|(i, c)| {
            let byte = self.0[i / 2];
            let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
            HEX_DIGITS[nibble as usize] == c
        })
    }

    /// EIP-55 mixed-case rendering with `0x`.
    pub fn to_checksum(&self) -> String {
        let hex_addr = self.to_hex();
        let mut hasher = Keccak::v256();
        hasher.update(hex_addr.as_bytes());
        let mut hash = [0u8; 32];
        hasher.finalize(&mut hash);

        let mut checksum = String::with_capacity(ADDRESS_HEX_LEN + 2);
        checksum.push_str("0x");

        for (i, c) in hex_addr.chars().enumerate() {
            let hash_byte = hash[i / 2];
            let hash_nibble = if i % 2 == 0 {
                hash_byte >> 4
            } else {
                hash_byte & 0x0f
            };

            if hash_nibble >= 8 {
                checksum.push(c.to_ascii_uppercase());
            } else {
                checksum.push(c);
            }
        }

        checksum
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex_prefixed())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_checksum())
    }
}
