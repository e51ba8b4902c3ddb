//! Prefix canonicalization and matching.
//!
//! User input is mapped onto the hex alphabet with a fixed look-alike table
//! (`canonical`), then compiled into a [`Prefix`] that workers test
//! addresses against.

mod canonical;
mod prefix;

pub use canonical::{canonicalize, PrefixError, RESERVED};
pub use prefix::Prefix;
