//! Ethereum keypair generation.

use secp256k1::{All, PublicKey, Secp256k1, SecretKey};
use tiny_keccak::{Hasher, Keccak};

use super::Address;

/// A private key together with the address it controls.
#[derive(Debug, Clone)]
pub struct Keypair {
    secret_key: [u8; 32],
    address: Address,
}

impl Keypair {
    /// Assembles a keypair from parts that are already known to belong together.
    ///
    /// No derivation is performed; this is how non-secp sources (and test
    /// doubles) hand candidates to the search engine.
    pub const fn from_parts(secret_key: [u8; 32], address: Address) -> Self {
        Self {
            secret_key,
            address,
        }
    }

    /// Derives the keypair for an existing secret key.
    pub fn from_secret_key(secret_bytes: [u8; 32]) -> Result<Self, secp256k1::Error> {
        let secp = Secp256k1::new();
        let secret_key = SecretKey::from_slice(&secret_bytes)?;
        let public_key = PublicKey::from_secret_key(&secp, &secret_key);

        Ok(Self::from_keys(&secret_key, &public_key))
    }

    #[inline]
    fn from_keys(secret_key: &SecretKey, public_key: &PublicKey) -> Self {
        Self {
            secret_key: secret_key.secret_bytes(),
            address: derive_address(public_key),
        }
    }

    /// Returns the private key as a 64 digit hex string (without 0x prefix).
    pub fn private_key_hex(&self) -> String {
        hex::encode(self.secret_key)
    }

    pub fn private_key_bytes(&self) -> &[u8; 32] {
        &self.secret_key
    }

    #[inline]
    pub fn address(&self) -> &Address {
        &self.address
    }
}

/// Derives an Ethereum address from a secp256k1 public key.
///
/// Keccak-256 over the 64 byte uncompressed key (without the 0x04 tag),
/// keeping the last 20 bytes of the digest.
#[inline]
fn derive_address(public_key: &PublicKey) -> Address {
    let public_key_bytes = public_key.serialize_uncompressed();

    let mut hasher = Keccak::v256();
    hasher.update(&public_key_bytes[1..]);

    let mut hash = [0u8; 32];
    hasher.finalize(&mut hash);

    let mut address_bytes = [0u8; 20];
    address_bytes.copy_from_slice(&hash[12..]);

    Address::from_bytes(address_bytes)
}

/// Produces candidate keypairs for the search engine.
///
/// Implementations are shared by every worker thread. A source that cannot
/// produce a keypair has no way to recover and should panic; the search
/// treats that as fatal.
pub trait KeypairSource: Send + Sync {
    fn generate(&self) -> Keypair;
}

/// Random secp256k1 keypairs from the thread-local CSPRNG.
pub struct Secp256k1Source {
    secp: Secp256k1<All>,
}

impl Secp256k1Source {
    pub fn new() -> Self {
        Self {
            secp: Secp256k1::new(),
        }
    }
}

impl Default for Secp256k1Source {
    fn default() -> Self {
        Self::new()
    }
}

impl KeypairSource for Secp256k1Source {
    #[inline]
    fn generate(&self) -> Keypair {
        let (secret_key, public_key) = self.secp.generate_keypair(&mut rand::thread_rng());
        Keypair::from_keys(&secret_key, &public_key)
    }
}
