//! ABI codec error types

use cadenza_primitives::AddressError;
use thiserror::Error;

/// ABI codec error
///
/// One variant per failure kind: schema problems surface while loading the
/// JSON description, argument-shape and conversion problems while packing,
/// decode problems while unpacking.
#[derive(Debug, Error)]
pub enum AbiError {
    /// Malformed ABI JSON
    #[error("invalid ABI JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Unrecognized or out-of-range type in the ABI description
    #[error("schema error: {0}")]
    Schema(String),

    /// No function with the given name and no fallback declared
    #[error("unknown function: {0}")]
    UnknownFunction(String),

    /// Argument list length does not match the function's declaration
    #[error("{expected} arguments expected, {got} received")]
    ArgumentCount {
        /// Declared argument count
        expected: usize,
        /// Supplied argument count
        got: usize,
    },

    /// Argument has the wrong shape (e.g. non-array value for an array slot)
    #[error("argument error: {0}")]
    Argument(String),

    /// Host value cannot be converted to the declared ABI type
    #[error("conversion error: {0}")]
    Conversion(String),

    /// Encoded data cannot be decoded into the requested destination
    #[error("decode error: {0}")]
    Decode(String),

    /// Operation is not implemented for this type (fixed/ufixed)
    #[error("unsupported: {0}")]
    Unsupported(String),
}

impl From<AddressError> for AbiError {
    fn from(e: AddressError) -> Self {
        AbiError::Conversion(e.to_string())
    }
}
