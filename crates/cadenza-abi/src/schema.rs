//! Contract ABI JSON loading
//!
//! The standard description is a flat JSON array of entries tagged by
//! `type`. Entries with tags other than `constructor`, `fallback`, `event`,
//! and `function` are ignored, as are fields this codec has no use for
//! (`constant`, `payable`, `stateMutability`, and nested `components`).

use regex::Regex;
use serde::Deserialize;

use crate::element::ElemType;
use crate::error::AbiError;
use crate::spec::{AbiSpec, Argument, ArrayKind, Event, Function};

#[derive(Debug, Deserialize)]
struct ParamJson {
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    type_str: String,
    #[serde(default)]
    indexed: bool,
}

#[derive(Debug, Deserialize)]
struct EntryJson {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    inputs: Vec<ParamJson>,
    #[serde(default)]
    outputs: Vec<ParamJson>,
    #[serde(default)]
    anonymous: bool,
}

/// Parse a standard contract ABI JSON document into an [`AbiSpec`]
pub(crate) fn load_spec(json: &[u8]) -> Result<AbiSpec, AbiError> {
    let entries: Vec<EntryJson> = serde_json::from_slice(json)?;

    let mut spec = AbiSpec::default();
    for entry in entries {
        match entry.kind.as_str() {
            "constructor" => {
                spec.constructor = Function {
                    inputs: parse_args(&entry.inputs)?,
                    outputs: Vec::new(),
                };
            }
            "fallback" => {
                spec.fallback = Some(Function::default());
            }
            "event" => {
                let inputs = parse_args(&entry.inputs)?;
                spec.events.insert(
                    entry.name,
                    Event {
                        inputs,
                        anonymous: entry.anonymous,
                    },
                );
            }
            "function" => {
                let function = Function {
                    inputs: parse_args(&entry.inputs)?,
                    outputs: parse_args(&entry.outputs)?,
                };
                spec.functions.insert(entry.name, function);
            }
            _ => {}
        }
    }
    Ok(spec)
}

fn parse_args(params: &[ParamJson]) -> Result<Vec<Argument>, AbiError> {
    params
        .iter()
        .map(|p| {
            let (elem, array) = parse_type(&p.type_str)?;
            Ok(Argument {
                name: p.name.clone(),
                elem,
                array,
                indexed: p.indexed,
            })
        })
        .collect()
}

/// Parse an ABI type string (`uint8`, `bytes32`, `int[]`, `address[3]`,
/// `fixed128x18`, ...) into an element type and array modifier
pub fn parse_type(type_str: &str) -> Result<(ElemType, ArrayKind), AbiError> {
    let (base, array) = split_array_suffix(type_str)?;
    let elem = parse_elem(base)?;
    Ok((elem, array))
}

/// Strip one optional array suffix; nested arrays are not supported
fn split_array_suffix(type_str: &str) -> Result<(&str, ArrayKind), AbiError> {
    let fixed_array = Regex::new(r"^(.*)\[([0-9]+)\]$").expect("valid regex");
    if let Some(caps) = fixed_array.captures(type_str) {
        let digits = caps.get(2).expect("capture group").as_str();
        // Lengths are bounded to 32 bits
        let len: u32 = digits.parse().map_err(|_| {
            AbiError::Schema(format!("invalid array length in {:?}", type_str))
        })?;
        let base = caps.get(1).expect("capture group").as_str();
        return Ok((base, ArrayKind::Fixed(len as usize)));
    }
    if let Some(base) = type_str.strip_suffix("[]") {
        return Ok((base, ArrayKind::Dynamic));
    }
    Ok((type_str, ArrayKind::None))
}

fn parse_elem(base: &str) -> Result<ElemType, AbiError> {
    let sized = Regex::new(r"^(bytes|uint|int)([0-9]+)$").expect("valid regex");
    if let Some(caps) = sized.captures(base) {
        let m: u64 = caps
            .get(2)
            .expect("capture group")
            .as_str()
            .parse()
            .map_err(|_| AbiError::Schema(format!("{} is not a valid type", base)))?;
        let m = m as usize;
        return match caps.get(1).expect("capture group").as_str() {
            "bytes" => {
                if !(1..=32).contains(&m) {
                    return Err(AbiError::Schema(format!("bytes{} is not a valid type", m)));
                }
                Ok(ElemType::FixedBytes(m))
            }
            "uint" => {
                check_int_width(m, base)?;
                Ok(ElemType::Uint(m))
            }
            "int" => {
                check_int_width(m, base)?;
                Ok(ElemType::Int(m))
            }
            _ => unreachable!("pattern admits three prefixes"),
        };
    }

    let fixed = Regex::new(r"^(fixed|ufixed)([0-9]+)x([0-9]+)$").expect("valid regex");
    if let Some(caps) = fixed.captures(base) {
        let parse = |i: usize| -> Result<usize, AbiError> {
            caps.get(i)
                .expect("capture group")
                .as_str()
                .parse::<u64>()
                .map(|v| v as usize)
                .map_err(|_| AbiError::Schema(format!("{} is not a valid type", base)))
        };
        let bits = parse(2)?;
        let exp = parse(3)?;
        if !(8..=256).contains(&bits) || bits % 8 != 0 || !(1..=80).contains(&exp) {
            return Err(AbiError::Schema(format!("{} is not a valid type", base)));
        }
        let signed = caps.get(1).expect("capture group").as_str() == "fixed";
        return Ok(ElemType::Fixed { bits, exp, signed });
    }

    match base {
        "uint" => Ok(ElemType::Uint(256)),
        "int" => Ok(ElemType::Int(256)),
        "address" => Ok(ElemType::Address),
        "bool" => Ok(ElemType::Bool),
        "fixed" => Ok(ElemType::Fixed { bits: 128, exp: 8, signed: true }),
        "ufixed" => Ok(ElemType::Fixed { bits: 128, exp: 8, signed: false }),
        "bytes" => Ok(ElemType::Bytes),
        "string" => Ok(ElemType::String),
        other => Err(AbiError::Schema(format!("{:?} is not a valid type", other))),
    }
}

fn check_int_width(m: usize, base: &str) -> Result<(), AbiError> {
    if !(8..=256).contains(&m) || m % 8 != 0 {
        return Err(AbiError::Schema(format!("{} is not a valid type", base)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scalar_types() {
        assert_eq!(parse_type("address").unwrap(), (ElemType::Address, ArrayKind::None));
        assert_eq!(parse_type("bool").unwrap(), (ElemType::Bool, ArrayKind::None));
        assert_eq!(parse_type("string").unwrap(), (ElemType::String, ArrayKind::None));
        assert_eq!(parse_type("bytes").unwrap(), (ElemType::Bytes, ArrayKind::None));
        assert_eq!(parse_type("bytes32").unwrap(), (ElemType::FixedBytes(32), ArrayKind::None));
        assert_eq!(parse_type("uint8").unwrap(), (ElemType::Uint(8), ArrayKind::None));
        assert_eq!(parse_type("int128").unwrap(), (ElemType::Int(128), ArrayKind::None));
    }

    #[test]
    fn test_parse_bare_defaults() {
        assert_eq!(parse_type("uint").unwrap().0, ElemType::Uint(256));
        assert_eq!(parse_type("int").unwrap().0, ElemType::Int(256));
        assert_eq!(
            parse_type("fixed").unwrap().0,
            ElemType::Fixed { bits: 128, exp: 8, signed: true }
        );
        assert_eq!(
            parse_type("ufixed").unwrap().0,
            ElemType::Fixed { bits: 128, exp: 8, signed: false }
        );
    }

    #[test]
    fn test_parse_array_suffixes() {
        assert_eq!(
            parse_type("uint256[3]").unwrap(),
            (ElemType::Uint(256), ArrayKind::Fixed(3))
        );
        assert_eq!(
            parse_type("address[]").unwrap(),
            (ElemType::Address, ArrayKind::Dynamic)
        );
        assert_eq!(
            parse_type("int[7]").unwrap(),
            (ElemType::Int(256), ArrayKind::Fixed(7))
        );
    }

    #[test]
    fn test_parse_fixed_point() {
        assert_eq!(
            parse_type("fixed128x18").unwrap().0,
            ElemType::Fixed { bits: 128, exp: 18, signed: true }
        );
        assert_eq!(
            parse_type("ufixed64x10").unwrap().0,
            ElemType::Fixed { bits: 64, exp: 10, signed: false }
        );
    }

    #[test]
    fn test_parse_rejects_bad_widths() {
        assert!(parse_type("uint7").is_err());
        assert!(parse_type("uint0").is_err());
        assert!(parse_type("uint264").is_err());
        assert!(parse_type("int12").is_err());
        assert!(parse_type("bytes0").is_err());
        assert!(parse_type("bytes33").is_err());
        assert!(parse_type("fixed128x0").is_err());
        assert!(parse_type("fixed128x81").is_err());
        assert!(parse_type("fixed7x8").is_err());
    }

    #[test]
    fn test_parse_rejects_unknown_bases() {
        assert!(parse_type("uint256x").is_err());
        assert!(parse_type("notbytes32").is_err());
        assert!(parse_type("tuple").is_err());
        assert!(parse_type("").is_err());
    }

    #[test]
    fn test_load_spec_dispatch() {
        let json = br#"[
            {"type": "constructor", "inputs": [{"name": "owner", "type": "address"}]},
            {"type": "fallback"},
            {"type": "function", "name": "transfer",
             "inputs": [{"name": "to", "type": "address"}, {"name": "amount", "type": "uint256"}],
             "outputs": [{"name": "", "type": "bool"}],
             "constant": false, "payable": false, "stateMutability": "nonpayable"},
            {"type": "event", "name": "Transfer", "anonymous": false,
             "inputs": [{"name": "from", "type": "address", "indexed": true},
                        {"name": "to", "type": "address", "indexed": true},
                        {"name": "value", "type": "uint256", "indexed": false}]},
            {"type": "receive"}
        ]"#;
        let spec = load_spec(json).unwrap();

        assert_eq!(spec.constructor.inputs.len(), 1);
        assert_eq!(spec.constructor.inputs[0].elem, ElemType::Address);
        assert!(spec.fallback.is_some());

        let transfer = spec.function("transfer").unwrap();
        assert_eq!(transfer.inputs.len(), 2);
        assert_eq!(transfer.outputs.len(), 1);
        assert_eq!(transfer.inputs[1].elem, ElemType::Uint(256));

        let event = spec.event("Transfer").unwrap();
        assert!(!event.anonymous);
        assert!(event.inputs[0].indexed);
        assert!(!event.inputs[2].indexed);

        // The "receive" entry is ignored
        assert_eq!(spec.functions.len(), 1);
    }

    #[test]
    fn test_load_spec_rejects_bad_type() {
        let json = br#"[{"type": "function", "name": "f", "inputs": [{"name": "x", "type": "uint7"}], "outputs": []}]"#;
        assert!(matches!(load_spec(json), Err(AbiError::Schema(_))));
    }

    #[test]
    fn test_load_spec_rejects_malformed_json() {
        assert!(matches!(
            load_spec(b"{not json"),
            Err(AbiError::Json(_))
        ));
    }
}
