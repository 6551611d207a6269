//! Host-side value representations
//!
//! [`Value`] is what callers hand to the packer; it covers every input shape
//! the codec accepts (native values, decimal/hex strings, raw buffers).
//! [`Slot`] is a destination for one decoded argument; `packing_types`
//! hands out each argument's preferred slot so callers can preallocate.

use std::fmt;

use cadenza_primitives::{Address, U256};

/// Signed 256-bit integer, stored as magnitude plus sign
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct I256 {
    /// Absolute value
    pub abs: U256,
    /// Sign (true if negative)
    pub negative: bool,
}

impl I256 {
    /// Create a new I256; negative zero normalizes to zero
    pub fn new(abs: U256, negative: bool) -> Self {
        Self {
            negative: negative && !abs.is_zero(),
            abs,
        }
    }

    /// Create from i128
    pub fn from_i128(value: i128) -> Self {
        if value < 0 {
            Self {
                abs: U256::from(value.unsigned_abs()),
                negative: true,
            }
        } else {
            Self {
                abs: U256::from(value as u128),
                negative: false,
            }
        }
    }

    /// Check if zero
    pub fn is_zero(&self) -> bool {
        self.abs.is_zero()
    }
}

impl From<i64> for I256 {
    fn from(value: i64) -> Self {
        Self::from_i128(value as i128)
    }
}

impl fmt::Display for I256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            write!(f, "-{}", self.abs)
        } else {
            write!(f, "{}", self.abs)
        }
    }
}

/// A host value supplied to the packer
///
/// Each ABI element type accepts a subset of these shapes; see the per-type
/// conversion rules in [`crate::ElemType::pack`]. Strings double as a
/// universal input: `"true"` for bool, decimal or `0x`-hex for integers,
/// hex for addresses, raw text for `bytes`/`string`, and `"[a,b,c]"` for
/// arrays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Boolean
    Bool(bool),
    /// Unsigned 64-bit integer
    U64(u64),
    /// Signed 64-bit integer
    I64(i64),
    /// Unsigned 256-bit integer
    Uint(U256),
    /// Signed 256-bit integer
    Int(I256),
    /// Text (also accepted for numeric, bool, address, and array slots)
    String(String),
    /// Raw bytes
    Bytes(Vec<u8>),
    /// Contract address
    Address(Address),
    /// Array of values, one per element
    Array(Vec<Value>),
}

impl Value {
    /// Short description of the value's shape, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::U64(_) => "u64",
            Value::I64(_) => "i64",
            Value::Uint(_) => "uint",
            Value::Int(_) => "int",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Address(_) => "address",
            Value::Array(_) => "array",
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::U64(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::I64(n)
    }
}

impl From<U256> for Value {
    fn from(n: U256) -> Self {
        Value::Uint(n)
    }
}

impl From<Address> for Value {
    fn from(a: Address) -> Self {
        Value::Address(a)
    }
}

/// A destination for one decoded argument
///
/// The variant selects the host representation the decoder must produce;
/// width checks happen against the variant, so decoding `0xFF...FF` into
/// a `U8` slot fails rather than truncating. A `Str` slot accepts any
/// element type, and for array arguments yields `"[e1,e2,...,en]"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    /// Boolean destination
    Bool(bool),
    /// u8 destination
    U8(u8),
    /// u16 destination
    U16(u16),
    /// u32 destination
    U32(u32),
    /// u64 destination
    U64(u64),
    /// i8 destination
    I8(i8),
    /// i16 destination
    I16(i16),
    /// i32 destination
    I32(i32),
    /// i64 destination
    I64(i64),
    /// 256-bit unsigned destination
    Uint(U256),
    /// 256-bit signed destination
    Int(I256),
    /// Address destination
    Address(Address),
    /// Byte-buffer destination
    Bytes(Vec<u8>),
    /// String destination
    Str(String),
    /// Array destination, one slot per element
    Array(Vec<Slot>),
}

impl Slot {
    /// Short description of the slot's shape, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Slot::Bool(_) => "bool",
            Slot::U8(_) => "u8",
            Slot::U16(_) => "u16",
            Slot::U32(_) => "u32",
            Slot::U64(_) => "u64",
            Slot::I8(_) => "i8",
            Slot::I16(_) => "i16",
            Slot::I32(_) => "i32",
            Slot::I64(_) => "i64",
            Slot::Uint(_) => "uint",
            Slot::Int(_) => "int",
            Slot::Address(_) => "address",
            Slot::Bytes(_) => "bytes",
            Slot::Str(_) => "string",
            Slot::Array(_) => "array",
        }
    }
}
