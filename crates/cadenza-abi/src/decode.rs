//! Return-value unpacking
//!
//! The decoder walks the head with a cursor, mirroring the layout the
//! packer produced: fixed values are read in place, dynamic values through
//! their head offsets. Callers pass one destination [`Slot`] per argument;
//! [`packing_types`] preallocates the preferred destinations.
//!
//! Buffers must not carry a selector prefix; callers strip it beforehand.

use crate::element::{check_length, read_word_usize, ElemType, WORD};
use crate::error::AbiError;
use crate::spec::{Argument, ArrayKind};
use crate::value::Slot;

/// Decode a byte buffer into one destination slot per argument
pub fn unpack(args: &[Argument], data: &[u8], outs: &mut [Slot]) -> Result<(), AbiError> {
    if args.len() != outs.len() {
        return Err(AbiError::ArgumentCount {
            expected: args.len(),
            got: outs.len(),
        });
    }

    let mut cursor = 0usize;
    for (index, (arg, out)) in args.iter().zip(outs.iter_mut()).enumerate() {
        match arg.array {
            ArrayKind::None => unpack_scalar(&arg.elem, data, &mut cursor, out)?,
            ArrayKind::Fixed(len) => {
                unpack_fixed_array(&arg.elem, len, data, &mut cursor, out, index)?
            }
            ArrayKind::Dynamic => unpack_dynamic_array(&arg.elem, data, &mut cursor, out, index)?,
        }
    }
    Ok(())
}

/// The preferred destination slots for an argument list, so callers can
/// preallocate outputs before calling [`unpack`]
pub fn packing_types(args: &[Argument]) -> Vec<Slot> {
    args.iter()
        .map(|arg| match arg.array {
            ArrayKind::None => arg.elem.default_slot(),
            ArrayKind::Fixed(len) => Slot::Array(vec![arg.elem.default_slot(); len]),
            ArrayKind::Dynamic => Slot::Array(Vec::new()),
        })
        .collect()
}

/// Decode one scalar (or one fixed-array element) at the cursor
fn unpack_scalar(
    elem: &ElemType,
    data: &[u8],
    cursor: &mut usize,
    out: &mut Slot,
) -> Result<(), AbiError> {
    if elem.is_dynamic() {
        let payload = read_word_usize(data, *cursor)?;
        *cursor += WORD;
        elem.unpack(data, payload, out)?;
    } else {
        *cursor += elem.unpack(data, *cursor, out)?;
    }
    Ok(())
}

fn unpack_fixed_array(
    elem: &ElemType,
    len: usize,
    data: &[u8],
    cursor: &mut usize,
    out: &mut Slot,
    index: usize,
) -> Result<(), AbiError> {
    match out {
        Slot::Array(slots) => {
            if slots.len() != len {
                return Err(AbiError::Argument(format!(
                    "argument {} should be an array of {} element slots, got {}",
                    index,
                    len,
                    slots.len()
                )));
            }
            for slot in slots.iter_mut() {
                unpack_scalar(elem, data, cursor, slot)?;
            }
            Ok(())
        }
        Slot::Str(joined) => {
            let mut slots = vec![Slot::Str(String::new()); len];
            for slot in slots.iter_mut() {
                unpack_scalar(elem, data, cursor, slot)?;
            }
            *joined = join_strings(&slots);
            Ok(())
        }
        other => Err(AbiError::Argument(format!(
            "argument {} should be an array or string destination, not {}",
            index,
            other.kind()
        ))),
    }
}

fn unpack_dynamic_array(
    elem: &ElemType,
    data: &[u8],
    cursor: &mut usize,
    out: &mut Slot,
    index: usize,
) -> Result<(), AbiError> {
    let payload = read_word_usize(data, *cursor)?;
    *cursor += WORD;
    let len = read_word_usize(data, payload)?;

    // Every element occupies at least one word; reject lengths the buffer
    // cannot possibly hold before allocating for them
    let min_len = len
        .checked_mul(WORD)
        .and_then(|n| n.checked_add(WORD))
        .and_then(|n| n.checked_add(payload))
        .ok_or_else(|| AbiError::Decode(format!("array length {} overflows", len)))?;
    check_length(data, min_len)?;

    // Elements sit inline after the length word
    let decode_into = |slots: &mut [Slot]| -> Result<(), AbiError> {
        let mut pos = payload + WORD;
        for slot in slots.iter_mut() {
            pos += elem.unpack(data, pos, slot)?;
        }
        Ok(())
    };

    match out {
        Slot::Array(slots) => {
            *slots = vec![elem.default_slot(); len];
            decode_into(slots)
        }
        Slot::Str(joined) => {
            let mut slots = vec![Slot::Str(String::new()); len];
            decode_into(&mut slots)?;
            *joined = join_strings(&slots);
            Ok(())
        }
        other => Err(AbiError::Argument(format!(
            "argument {} should be an array or string destination, not {}",
            index,
            other.kind()
        ))),
    }
}

/// Render decoded string slots as `"[e1,e2,...,en]"`
fn join_strings(slots: &[Slot]) -> String {
    let parts: Vec<&str> = slots
        .iter()
        .map(|slot| match slot {
            Slot::Str(s) => s.as_str(),
            _ => "",
        })
        .collect();
    format!("[{}]", parts.join(","))
}
