//! # eth_vanity_wallet
//!
//! Ethereum vanity address generator with password-protected private keys.
//!
//! ## Architecture
//!
//! - `crypto`: Key generation and address derivation
//! - `matcher`: Prefix canonicalization and matching
//! - `worker`: Parallel search, progress reporting
//! - `cipher`: Password-based string encryption
//! - `config`: Command line configuration

pub mod cipher;
pub mod config;
pub mod crypto;
pub mod matcher;
pub mod worker;

pub use cipher::{decrypt, derive_key, encrypt, DecryptionError};
pub use config::Config;
pub use crypto::{Address, Keypair, KeypairSource, Secp256k1Source};
pub use matcher::{canonicalize, Prefix, PrefixError};
pub use worker::{
    search, Match, ProgressReport, ProgressSink, SearchEngine, SearchError, SearchOutcome,
    StdoutProgress,
};
