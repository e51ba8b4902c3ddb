//! Ethereum key and address generation.
//!
//! - Random secp256k1 keypairs behind the [`KeypairSource`] seam
//! - Address derivation with Keccak-256
//! - Allocation-free prefix checks on addresses

mod address;
mod keypair;

pub use address::{Address, ADDRESS_HEX_LEN};
pub use keypair::{Keypair, KeypairSource, Secp256k1Source};
