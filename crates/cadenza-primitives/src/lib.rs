//! # cadenza-primitives
//!
//! Primitive types shared by the Cadenza ABI codec.
//!
//! Provides the 20-byte contract [`Address`] (including its 32-byte ABI
//! word form), the 32-byte [`H256`] hash (including selector extraction),
//! and re-exports `primitive_types::U256` for 256-bit arithmetic.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod address;
mod error;
mod hash;

pub use address::{Address, AddressError};
pub use error::PrimitiveError;
pub use hash::{H256, HashError};

// Re-export primitive-types for U256
pub use primitive_types::U256;
