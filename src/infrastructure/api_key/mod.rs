//! API key infrastructure implementations
//!
//! This module provides key hashing and issuance.

mod hasher;
mod issuer;

pub use hasher::KeyHasher;
pub use issuer::{KeyIssuer, OsRandom, RandomSource, MIN_KEY_BYTES};
