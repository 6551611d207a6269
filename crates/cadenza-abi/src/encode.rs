//! Call packing
//!
//! Encoding produces two streams: the head, one fixed-size slot per
//! top-level argument, and the tail, which holds dynamic payloads. Head
//! slots for dynamic values carry big-endian byte offsets measured from the
//! start of the head; the head's total length seeds the first offset. The
//! 4-byte selector is prepended only when a function name is given, so the
//! same path encodes constructor arguments.

use cadenza_crypto::keccak256;
use cadenza_primitives::U256;

use crate::element::{u256_word, ElemType, WORD};
use crate::error::AbiError;
use crate::spec::{Argument, ArrayKind};
use crate::value::Value;

/// Build the canonical signature string `name(t1,t2,...,tn)`
pub fn signature(name: &str, args: &[Argument]) -> String {
    let inner: Vec<String> = args.iter().map(|a| a.type_signature()).collect();
    format!("{}({})", name, inner.join(","))
}

/// Compute a function selector: the first four bytes of the Keccak-256 of
/// the canonical signature string
pub fn function_selector(sig: &str) -> [u8; 4] {
    keccak256(sig.as_bytes()).selector()
}

/// Encode a call: selector (when `fname` is nonempty) followed by the
/// packed arguments
pub(crate) fn pack_call(
    fname: &str,
    args: &[Argument],
    values: &[Value],
) -> Result<Vec<u8>, AbiError> {
    if args.len() != values.len() {
        return Err(AbiError::ArgumentCount {
            expected: args.len(),
            got: values.len(),
        });
    }
    let mut packed = Vec::new();
    if !fname.is_empty() {
        packed.extend_from_slice(&function_selector(&signature(fname, args)));
    }
    packed.extend(pack_args(args, values)?);
    Ok(packed)
}

/// Pack an argument list without a selector prefix
pub fn pack_args(args: &[Argument], values: &[Value]) -> Result<Vec<u8>, AbiError> {
    if args.len() != values.len() {
        return Err(AbiError::ArgumentCount {
            expected: args.len(),
            got: values.len(),
        });
    }

    let mut head = Vec::new();
    let mut tail = Vec::new();
    // Cumulative offset of the next dynamic payload, measured from the
    // start of the head
    let mut offset = head_size(args);

    for (index, (arg, value)) in args.iter().zip(values.iter()).enumerate() {
        match arg.array {
            ArrayKind::None => {
                pack_scalar(&arg.elem, value, &mut head, &mut tail, &mut offset)?;
            }
            ArrayKind::Fixed(len) => {
                let items = array_items(value, index)?;
                if items.len() != len {
                    return Err(AbiError::Argument(format!(
                        "argument {} expects an array of {} elements, got {}",
                        index,
                        len,
                        items.len()
                    )));
                }
                for item in &items {
                    pack_scalar(&arg.elem, item, &mut head, &mut tail, &mut offset)?;
                }
            }
            ArrayKind::Dynamic => {
                let items = array_items(value, index)?;
                head.extend_from_slice(&u256_word(&U256::from(offset)));
                // Length word, then the elements packed in order
                let mut chunk = u256_word(&U256::from(items.len())).to_vec();
                for item in &items {
                    chunk.extend(arg.elem.pack(item)?);
                }
                offset += chunk.len();
                tail.extend(chunk);
            }
        }
    }

    head.extend(tail);
    Ok(head)
}

/// The head length in bytes: 32 per scalar or offset slot, 32·k for a
/// fixed-length array
pub(crate) fn head_size(args: &[Argument]) -> usize {
    args.iter()
        .map(|arg| match arg.array {
            ArrayKind::Fixed(len) => WORD * len,
            ArrayKind::Dynamic | ArrayKind::None => WORD,
        })
        .sum()
}

/// Pack one scalar (or one fixed-array element): inline for fixed-layout
/// elements, offset slot plus tail payload for dynamic ones
fn pack_scalar(
    elem: &ElemType,
    value: &Value,
    head: &mut Vec<u8>,
    tail: &mut Vec<u8>,
    offset: &mut usize,
) -> Result<(), AbiError> {
    if elem.is_dynamic() {
        head.extend_from_slice(&u256_word(&U256::from(*offset)));
        let payload = elem.pack(value)?;
        *offset += payload.len();
        tail.extend(payload);
    } else {
        head.extend(elem.pack(value)?);
    }
    Ok(())
}

/// Interpret an argument as an array: either a native [`Value::Array`] or a
/// `"[a,b,c]"` string split on commas
fn array_items(value: &Value, index: usize) -> Result<Vec<Value>, AbiError> {
    match value {
        Value::Array(items) => Ok(items.clone()),
        Value::String(s) if s.starts_with('[') && s.ends_with(']') => {
            let inner = &s[1..s.len() - 1];
            if inner.is_empty() {
                return Ok(Vec::new());
            }
            Ok(inner.split(',').map(Value::from).collect())
        }
        other => Err(AbiError::Argument(format!(
            "argument {} should be an array, not {}",
            index,
            other.kind()
        ))),
    }
}
