//! # cadenza-crypto
//!
//! Keccak-256 hashing (the EVM hash, not NIST SHA-3).
//!
//! The ABI codec treats the hash as an opaque `bytes -> 32 bytes` function;
//! this crate is its single cryptographic collaborator.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod hash;

pub use hash::keccak256;
