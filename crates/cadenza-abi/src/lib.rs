//! # cadenza-abi
//!
//! Codec for the EVM contract Application Binary Interface.
//!
//! - **Schema loading**: parse a contract's JSON interface description into
//!   an [`AbiSpec`]
//! - **Packing**: encode host values into the 32-byte-word calldata a
//!   contract expects, selector included
//! - **Unpacking**: decode a return buffer back into host values
//!
//! The codec is a pure synchronous library: an [`AbiSpec`] is read-only
//! after construction and safe to share across threads, and pack/unpack
//! hold no state between calls.
//!
//! ## Example
//!
//! ```rust
//! use cadenza_abi::{packing_types, unpack, AbiSpec, Slot, Value};
//!
//! let json = br#"[
//!     {"type": "function", "name": "transfer",
//!      "inputs": [{"name": "to", "type": "address"},
//!                 {"name": "amount", "type": "uint256"}],
//!      "outputs": [{"name": "", "type": "bool"}]}
//! ]"#;
//! let spec = AbiSpec::from_json(json)?;
//!
//! // Encode a call: 4-byte selector followed by two words
//! let data = spec.pack(
//!     "transfer",
//!     &[
//!         Value::from("0x742d35cc6634c0532925a3b844bc9e7595f0ab3d"),
//!         Value::from(1000u64),
//!     ],
//! )?;
//! assert_eq!(data.len(), 68);
//! assert_eq!(&data[..4], &[0xa9, 0x05, 0x9c, 0xbb]);
//!
//! // Decode a return buffer into preallocated destinations
//! let outputs = &spec.function("transfer").unwrap().outputs;
//! let mut outs = packing_types(outputs);
//! let mut ret = [0u8; 32];
//! ret[31] = 1;
//! unpack(outputs, &ret, &mut outs)?;
//! assert_eq!(outs[0], Slot::Bool(true));
//! # Ok::<(), cadenza_abi::AbiError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod decode;
mod element;
mod encode;
mod error;
mod schema;
mod spec;
mod value;

pub use decode::{packing_types, unpack};
pub use element::ElemType;
pub use encode::{function_selector, pack_args, signature};
pub use error::AbiError;
pub use schema::parse_type;
pub use spec::{AbiSpec, Argument, ArrayKind, Event, Function};
pub use value::{I256, Slot, Value};

// Re-export primitives for convenience
pub use cadenza_primitives::{Address, H256, U256};
