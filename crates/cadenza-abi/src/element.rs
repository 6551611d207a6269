//! ABI element types and their 32-byte word codecs
//!
//! Every ABI element is one variant of [`ElemType`]. A variant knows its
//! canonical signature fragment, whether its encoding is dynamic, and how to
//! pack a host [`Value`] into words / unpack words into a host [`Slot`].
//! Arrays are a modifier on an argument (see [`crate::spec::ArrayKind`]),
//! not an element type.

use cadenza_primitives::{Address, U256};

use crate::error::AbiError;
use crate::value::{I256, Slot, Value};

/// Encoded values are packed into 32-byte words
pub(crate) const WORD: usize = 32;

/// An ABI element type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElemType {
    /// `bool`
    Bool,
    /// `uintM`, M in {8, 16, ..., 256}
    Uint(usize),
    /// `intM`, M in {8, 16, ..., 256}
    Int(usize),
    /// `address` (20 bytes, right-aligned in a word)
    Address,
    /// `bytesM`, M in {1, ..., 32}: fixed bytes, left-aligned in a word
    FixedBytes(usize),
    /// `bytes`: dynamic byte string
    Bytes,
    /// `string`: dynamic text, byte-transparent
    String,
    /// `fixedMxN` / `ufixedMxN`: parsed and validated, but packing and
    /// unpacking are not implemented
    Fixed {
        /// Total bit width M
        bits: usize,
        /// Decimal exponent N
        exp: usize,
        /// Signed variant (`fixed`) vs unsigned (`ufixed`)
        signed: bool,
    },
}

impl ElemType {
    /// Canonical signature fragment (`uint256`, `bytes32`, ...)
    pub fn signature(&self) -> String {
        match self {
            ElemType::Bool => "bool".to_string(),
            ElemType::Uint(m) => format!("uint{}", m),
            ElemType::Int(m) => format!("int{}", m),
            ElemType::Address => "address".to_string(),
            ElemType::FixedBytes(m) => format!("bytes{}", m),
            ElemType::Bytes => "bytes".to_string(),
            ElemType::String => "string".to_string(),
            ElemType::Fixed { bits, exp, signed } => {
                if *signed {
                    format!("fixed{}x{}", bits, exp)
                } else {
                    format!("ufixed{}x{}", bits, exp)
                }
            }
        }
    }

    /// Whether the encoded length depends on the value
    pub fn is_dynamic(&self) -> bool {
        matches!(self, ElemType::Bytes | ElemType::String)
    }

    /// The preferred host destination for one decoded value of this type
    pub fn default_slot(&self) -> Slot {
        match self {
            ElemType::Bool => Slot::Bool(false),
            ElemType::Uint(8) => Slot::U8(0),
            ElemType::Uint(16) => Slot::U16(0),
            ElemType::Uint(32) => Slot::U32(0),
            ElemType::Uint(64) => Slot::U64(0),
            ElemType::Uint(_) => Slot::Uint(U256::zero()),
            ElemType::Int(8) => Slot::I8(0),
            ElemType::Int(16) => Slot::I16(0),
            ElemType::Int(32) => Slot::I32(0),
            ElemType::Int(64) => Slot::I64(0),
            ElemType::Int(_) => Slot::Int(I256::default()),
            ElemType::Address => Slot::Address(Address::ZERO),
            ElemType::FixedBytes(_) | ElemType::Bytes => Slot::Bytes(Vec::new()),
            ElemType::String | ElemType::Fixed { .. } => Slot::Str(String::new()),
        }
    }

    /// Pack one host value into a whole number of 32-byte words
    pub fn pack(&self, value: &Value) -> Result<Vec<u8>, AbiError> {
        match self {
            ElemType::Bool => pack_bool(value),
            ElemType::Uint(m) => pack_uint(*m, value),
            ElemType::Int(m) => pack_int(*m, value),
            ElemType::Address => pack_address(value),
            ElemType::FixedBytes(m) => pack_fixed_bytes(*m, value),
            ElemType::Bytes | ElemType::String => pack_blob(self, value),
            ElemType::Fixed { .. } => Err(AbiError::Unsupported(format!(
                "packing of {} is not implemented",
                self.signature()
            ))),
        }
    }

    /// Unpack the encoding at `offset` into `out`, returning bytes consumed
    ///
    /// Fixed types consume exactly one word; dynamic types read a length
    /// word followed by the payload.
    pub fn unpack(&self, data: &[u8], offset: usize, out: &mut Slot) -> Result<usize, AbiError> {
        match self {
            ElemType::Bool => unpack_bool(data, offset, out),
            ElemType::Uint(m) => unpack_uint(*m, data, offset, out),
            ElemType::Int(m) => unpack_int(*m, data, offset, out),
            ElemType::Address => unpack_address(data, offset, out),
            ElemType::FixedBytes(m) => unpack_fixed_bytes(*m, data, offset, out),
            ElemType::Bytes | ElemType::String => unpack_blob(self, data, offset, out),
            ElemType::Fixed { .. } => Err(AbiError::Unsupported(format!(
                "unpacking of {} is not implemented",
                self.signature()
            ))),
        }
    }
}

// ==================== shared word helpers ====================

/// Check that `data` holds at least `required` bytes
pub(crate) fn check_length(data: &[u8], required: usize) -> Result<(), AbiError> {
    if data.len() < required {
        return Err(AbiError::Decode(format!(
            "insufficient data: need {} bytes, have {}",
            required,
            data.len()
        )));
    }
    Ok(())
}

/// Serialize a U256 as one big-endian word
pub(crate) fn u256_word(value: &U256) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    value.to_big_endian(&mut bytes);
    bytes
}

/// Read the word at `offset` as a usize (offsets and lengths)
pub(crate) fn read_word_usize(data: &[u8], offset: usize) -> Result<usize, AbiError> {
    let word = word_at(data, offset)?;
    let value = U256::from_big_endian(word);
    if value.bits() > 64 {
        return Err(AbiError::Decode(format!(
            "offset or length {} does not fit the address space",
            value
        )));
    }
    Ok(value.low_u64() as usize)
}

fn word_at(data: &[u8], offset: usize) -> Result<&[u8], AbiError> {
    // Offsets come from wire data; guard the arithmetic as well as the bound
    let end = offset
        .checked_add(WORD)
        .ok_or_else(|| AbiError::Decode(format!("offset {} overflows", offset)))?;
    check_length(data, end)?;
    Ok(&data[offset..end])
}

/// Parse a decimal or 0x-prefixed hex string as an unsigned magnitude
fn parse_magnitude(s: &str, signature: &str) -> Result<U256, AbiError> {
    let parse_err = || AbiError::Conversion(format!("failed to parse {:?} as {}", s, signature));
    if let Some(digits) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        let padded = if digits.len() % 2 == 1 {
            format!("0{}", digits)
        } else {
            digits.to_string()
        };
        let bytes = hex::decode(&padded).map_err(|_| parse_err())?;
        if bytes.len() > WORD {
            return Err(AbiError::Conversion(format!(
                "value {:?} too large for {}",
                s, signature
            )));
        }
        Ok(U256::from_big_endian(&bytes))
    } else {
        U256::from_dec_str(s).map_err(|_| parse_err())
    }
}

// ==================== bool ====================

fn pack_bool(value: &Value) -> Result<Vec<u8>, AbiError> {
    let b = match value {
        Value::Bool(b) => *b,
        Value::String(s) => {
            if s.eq_ignore_ascii_case("true") || s == "1" {
                true
            } else if s.eq_ignore_ascii_case("false") || s == "0" {
                false
            } else {
                return Err(AbiError::Conversion(format!(
                    "{:?} is not a valid bool value",
                    s
                )));
            }
        }
        other => {
            return Err(AbiError::Conversion(format!(
                "cannot convert {} to bool",
                other.kind()
            )))
        }
    };
    let mut word = vec![0u8; WORD];
    if b {
        word[WORD - 1] = 1;
    }
    Ok(word)
}

fn unpack_bool(data: &[u8], offset: usize, out: &mut Slot) -> Result<usize, AbiError> {
    let word = word_at(data, offset)?;
    let byte = word[WORD - 1];
    match out {
        Slot::Str(s) => {
            *s = match byte {
                1 => "true".to_string(),
                0 => "false".to_string(),
                other => {
                    return Err(AbiError::Decode(format!(
                        "unexpected value 0x{:02x} for bool",
                        other
                    )))
                }
            };
        }
        Slot::Bool(b) => *b = byte == 1,
        other => {
            return Err(AbiError::Decode(format!(
                "cannot decode bool into {} destination",
                other.kind()
            )))
        }
    }
    Ok(WORD)
}

// ==================== uint ====================

/// Convert an accepted input shape to an unsigned magnitude, range-checked
fn to_u256(bits: usize, value: &Value) -> Result<U256, AbiError> {
    let signature = format!("uint{}", bits);
    let negative = |v: &dyn std::fmt::Display| {
        AbiError::Conversion(format!("negative value {} not allowed for {}", v, signature))
    };
    let n = match value {
        Value::Uint(n) => *n,
        Value::U64(n) => U256::from(*n),
        Value::I64(n) => {
            if *n < 0 {
                return Err(negative(n));
            }
            U256::from(*n as u64)
        }
        Value::Int(n) => {
            if n.negative {
                return Err(negative(n));
            }
            n.abs
        }
        Value::String(s) => parse_magnitude(s.trim(), &signature)?,
        other => {
            return Err(AbiError::Conversion(format!(
                "cannot convert {} to {}",
                other.kind(),
                signature
            )))
        }
    };
    if n.bits() > bits {
        return Err(AbiError::Conversion(format!(
            "value {} too large for {}",
            n, signature
        )));
    }
    Ok(n)
}

fn pack_uint(bits: usize, value: &Value) -> Result<Vec<u8>, AbiError> {
    let n = to_u256(bits, value)?;
    Ok(u256_word(&n).to_vec())
}

fn unpack_uint(_bits: usize, data: &[u8], offset: usize, out: &mut Slot) -> Result<usize, AbiError> {
    let word = word_at(data, offset)?;
    // Significant length: bytes below the most significant nonzero byte
    let length = WORD - word.iter().take_while(|b| **b == 0).count();

    // Unsigned destination of `width` bytes
    macro_rules! narrow_unsigned {
        ($dest:expr, $ty:ty) => {{
            let width = std::mem::size_of::<$ty>();
            if length > width {
                return Err(AbiError::Decode(format!(
                    "value too large for {}",
                    stringify!($ty)
                )));
            }
            let mut buf = [0u8; std::mem::size_of::<$ty>()];
            buf.copy_from_slice(&word[WORD - width..]);
            *$dest = <$ty>::from_be_bytes(buf);
        }};
    }
    // Signed destination: additionally refuse a set top bit in the window,
    // which a signed host type would misread as negative
    macro_rules! narrow_signed {
        ($dest:expr, $ty:ty) => {{
            let width = std::mem::size_of::<$ty>();
            if length > width || word[WORD - width] & 0x80 != 0 {
                return Err(AbiError::Decode(format!(
                    "value too large for {}",
                    stringify!($ty)
                )));
            }
            let mut buf = [0u8; std::mem::size_of::<$ty>()];
            buf.copy_from_slice(&word[WORD - width..]);
            *$dest = <$ty>::from_be_bytes(buf);
        }};
    }

    match out {
        Slot::Str(s) => *s = U256::from_big_endian(word).to_string(),
        Slot::Uint(n) => *n = U256::from_big_endian(word),
        Slot::Int(n) => *n = I256::new(U256::from_big_endian(word), false),
        Slot::U8(v) => narrow_unsigned!(v, u8),
        Slot::U16(v) => narrow_unsigned!(v, u16),
        Slot::U32(v) => narrow_unsigned!(v, u32),
        Slot::U64(v) => narrow_unsigned!(v, u64),
        Slot::I8(v) => narrow_signed!(v, i8),
        Slot::I16(v) => narrow_signed!(v, i16),
        Slot::I32(v) => narrow_signed!(v, i32),
        Slot::I64(v) => narrow_signed!(v, i64),
        other => {
            return Err(AbiError::Decode(format!(
                "cannot decode uint into {} destination",
                other.kind()
            )))
        }
    }
    Ok(WORD)
}

// ==================== int ====================

/// Convert an accepted input shape to a signed value, range-checked
fn to_i256(bits: usize, value: &Value) -> Result<I256, AbiError> {
    let signature = format!("int{}", bits);
    let n = match value {
        Value::Int(n) => *n,
        Value::I64(n) => I256::from(*n),
        Value::U64(n) => I256::new(U256::from(*n), false),
        Value::Uint(n) => I256::new(*n, false),
        Value::String(s) => {
            let s = s.trim();
            let (digits, negative) = match s.strip_prefix('-') {
                Some(rest) => (rest, true),
                None => (s, false),
            };
            I256::new(parse_magnitude(digits, &signature)?, negative)
        }
        other => {
            return Err(AbiError::Conversion(format!(
                "cannot convert {} to {}",
                other.kind(),
                signature
            )))
        }
    };
    if bits == 0 || bits > 256 {
        return Err(AbiError::Schema(format!("{} is not a valid type", signature)));
    }
    // Domain is [-2^(bits-1), 2^(bits-1) - 1]
    let limit = U256::one() << (bits - 1);
    let out_of_range = if n.negative { n.abs > limit } else { n.abs >= limit };
    if out_of_range {
        return Err(AbiError::Conversion(format!(
            "value {} too large for {}",
            n, signature
        )));
    }
    Ok(n)
}

fn pack_int(bits: usize, value: &Value) -> Result<Vec<u8>, AbiError> {
    let n = to_i256(bits, value)?;
    if n.negative {
        // Two's complement: the magnitude minus one, bitwise inverted
        let mut word = u256_word(&(n.abs - U256::one()));
        for byte in word.iter_mut() {
            *byte = !*byte;
        }
        Ok(word.to_vec())
    } else {
        Ok(u256_word(&n.abs).to_vec())
    }
}

fn unpack_int(_bits: usize, data: &[u8], offset: usize, out: &mut Slot) -> Result<usize, AbiError> {
    let word = word_at(data, offset)?;
    let negative = word[0] & 0x80 != 0;

    let magnitude = || -> U256 {
        if negative {
            let mut flipped = [0u8; WORD];
            for (i, byte) in word.iter().enumerate() {
                flipped[i] = !*byte;
            }
            U256::from_big_endian(&flipped) + U256::one()
        } else {
            U256::from_big_endian(word)
        }
    };

    // Unsigned destination: reject negative input, then apply the same
    // window rules as the uint path
    macro_rules! narrow_unsigned {
        ($dest:expr, $ty:ty) => {{
            if negative {
                return Err(AbiError::Decode(format!(
                    "cannot decode negative value into {} destination",
                    stringify!($ty)
                )));
            }
            let width = std::mem::size_of::<$ty>();
            let length = WORD - word.iter().take_while(|b| **b == 0).count();
            if length > width || word[WORD - width] & 0x80 != 0 {
                return Err(AbiError::Decode(format!(
                    "value too large for {}",
                    stringify!($ty)
                )));
            }
            let mut buf = [0u8; std::mem::size_of::<$ty>()];
            buf.copy_from_slice(&word[WORD - width..]);
            *$dest = <$ty>::from_be_bytes(buf);
        }};
    }
    // Signed destination: the value fits iff every byte above the window is
    // sign extension and the window's own top bit agrees with the sign
    macro_rules! narrow_signed {
        ($dest:expr, $ty:ty) => {{
            let width = std::mem::size_of::<$ty>();
            let sign_byte = if negative { 0xFFu8 } else { 0x00u8 };
            let extended = word[..WORD - width].iter().all(|b| *b == sign_byte);
            let top_bit = word[WORD - width] & 0x80 != 0;
            if !extended || top_bit != negative {
                return Err(AbiError::Decode(format!(
                    "value too large for {}",
                    stringify!($ty)
                )));
            }
            let mut buf = [0u8; std::mem::size_of::<$ty>()];
            buf.copy_from_slice(&word[WORD - width..]);
            *$dest = <$ty>::from_be_bytes(buf);
        }};
    }

    match out {
        Slot::Str(s) => {
            *s = I256::new(magnitude(), negative).to_string();
        }
        Slot::Int(n) => *n = I256::new(magnitude(), negative),
        Slot::Uint(n) => {
            if negative {
                return Err(AbiError::Decode(
                    "cannot decode negative value into uint destination".to_string(),
                ));
            }
            *n = U256::from_big_endian(word);
        }
        Slot::U8(v) => narrow_unsigned!(v, u8),
        Slot::U16(v) => narrow_unsigned!(v, u16),
        Slot::U32(v) => narrow_unsigned!(v, u32),
        Slot::U64(v) => narrow_unsigned!(v, u64),
        Slot::I8(v) => narrow_signed!(v, i8),
        Slot::I16(v) => narrow_signed!(v, i16),
        Slot::I32(v) => narrow_signed!(v, i32),
        Slot::I64(v) => narrow_signed!(v, i64),
        other => {
            return Err(AbiError::Decode(format!(
                "cannot decode int into {} destination",
                other.kind()
            )))
        }
    }
    Ok(WORD)
}

// ==================== address ====================

fn pack_address(value: &Value) -> Result<Vec<u8>, AbiError> {
    let addr = match value {
        Value::Address(a) => *a,
        Value::String(s) => Address::from_hex(s)?,
        Value::Bytes(b) => Address::from_slice(b)?,
        other => {
            return Err(AbiError::Conversion(format!(
                "cannot convert {} to address",
                other.kind()
            )))
        }
    };
    Ok(addr.to_word().to_vec())
}

fn unpack_address(data: &[u8], offset: usize, out: &mut Slot) -> Result<usize, AbiError> {
    let word = word_at(data, offset)?;
    let addr = Address::from_word(word).map_err(|e| AbiError::Decode(e.to_string()))?;
    match out {
        Slot::Address(a) => *a = addr,
        Slot::Str(s) => *s = addr.to_hex(),
        Slot::Bytes(b) => *b = addr.as_bytes().to_vec(),
        other => {
            return Err(AbiError::Decode(format!(
                "cannot decode address into {} destination",
                other.kind()
            )))
        }
    }
    Ok(WORD)
}

// ==================== bytesM ====================

fn blob_input<'a>(value: &'a Value, signature: &str) -> Result<&'a [u8], AbiError> {
    match value {
        Value::Bytes(b) => Ok(b),
        Value::String(s) => Ok(s.as_bytes()),
        other => Err(AbiError::Conversion(format!(
            "cannot convert {} to {}",
            other.kind(),
            signature
        ))),
    }
}

fn pack_fixed_bytes(size: usize, value: &Value) -> Result<Vec<u8>, AbiError> {
    if size == 0 || size > WORD {
        return Err(AbiError::Schema(format!("bytes{} is not a valid type", size)));
    }
    let bytes = blob_input(value, &format!("bytes{}", size))?;
    if bytes.len() > size {
        return Err(AbiError::Conversion(format!(
            "{}-byte value too long for bytes{}",
            bytes.len(),
            size
        )));
    }
    let mut word = vec![0u8; WORD];
    word[..bytes.len()].copy_from_slice(bytes);
    Ok(word)
}

fn unpack_fixed_bytes(
    size: usize,
    data: &[u8],
    offset: usize,
    out: &mut Slot,
) -> Result<usize, AbiError> {
    if size == 0 || size > WORD {
        return Err(AbiError::Schema(format!("bytes{} is not a valid type", size)));
    }
    let word = word_at(data, offset)?;
    let window = &word[..size];
    match out {
        Slot::Bytes(b) => *b = window.to_vec(),
        Slot::Str(s) => {
            // Zero bytes padding either side of the window are not text;
            // the codec imposes no character set on what remains
            let mut start = 0;
            let mut end = size;
            while start < end && window[start] == 0 {
                start += 1;
            }
            while end > start && window[end - 1] == 0 {
                end -= 1;
            }
            *s = String::from_utf8_lossy(&window[start..end]).into_owned();
        }
        other => {
            return Err(AbiError::Decode(format!(
                "cannot decode bytes{} into {} destination",
                size,
                other.kind()
            )))
        }
    }
    Ok(WORD)
}

// ==================== bytes / string (dynamic) ====================

fn pack_blob(elem: &ElemType, value: &Value) -> Result<Vec<u8>, AbiError> {
    let bytes = blob_input(value, &elem.signature())?;
    let mut packed = u256_word(&U256::from(bytes.len())).to_vec();
    for chunk in bytes.chunks(WORD) {
        let mut word = [0u8; WORD];
        word[..chunk.len()].copy_from_slice(chunk);
        packed.extend_from_slice(&word);
    }
    Ok(packed)
}

fn unpack_blob(
    elem: &ElemType,
    data: &[u8],
    offset: usize,
    out: &mut Slot,
) -> Result<usize, AbiError> {
    let len = read_word_usize(data, offset)?;
    let start = offset + WORD;
    let end = start
        .checked_add(len)
        .ok_or_else(|| AbiError::Decode(format!("length {} overflows", len)))?;
    check_length(data, end)?;
    let payload = &data[start..end];
    match out {
        Slot::Bytes(b) => *b = payload.to_vec(),
        // Byte-transparent: no character set is enforced
        Slot::Str(s) => *s = String::from_utf8_lossy(payload).into_owned(),
        other => {
            return Err(AbiError::Decode(format!(
                "cannot decode {} into {} destination",
                elem.signature(),
                other.kind()
            )))
        }
    }
    Ok(WORD + len.div_ceil(WORD) * WORD)
}
