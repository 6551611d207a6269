//! Property tests: packing then unpacking returns the input, and every
//! encoding is a whole number of 32-byte words.

use cadenza_abi::{pack_args, parse_type, unpack, Argument, Slot, Value};
use cadenza_primitives::Address;
use proptest::prelude::*;

fn arg(type_str: &str) -> Argument {
    let (elem, array) = parse_type(type_str).unwrap();
    Argument {
        name: String::new(),
        elem,
        array,
        indexed: false,
    }
}

fn round_trip(type_str: &str, value: Value, out: Slot) -> Slot {
    let args = [arg(type_str)];
    let packed = pack_args(&args, &[value]).unwrap();
    assert_eq!(packed.len() % 32, 0, "encoding must be word-aligned");
    let mut outs = [out];
    unpack(&args, &packed, &mut outs).unwrap();
    let [slot] = outs;
    slot
}

proptest! {
    #[test]
    fn uint64_round_trip(x: u64) {
        prop_assert_eq!(round_trip("uint64", Value::U64(x), Slot::U64(0)), Slot::U64(x));
    }

    #[test]
    fn int64_round_trip(x: i64) {
        prop_assert_eq!(round_trip("int64", Value::I64(x), Slot::I64(0)), Slot::I64(x));
    }

    #[test]
    fn uint256_decimal_string_round_trip(x: u128) {
        let decoded = round_trip(
            "uint256",
            Value::String(x.to_string()),
            Slot::Str(String::new()),
        );
        prop_assert_eq!(decoded, Slot::Str(x.to_string()));
    }

    #[test]
    fn bool_round_trip(b: bool) {
        prop_assert_eq!(round_trip("bool", Value::Bool(b), Slot::Bool(!b)), Slot::Bool(b));
    }

    #[test]
    fn address_round_trip(bytes: [u8; 20]) {
        let addr = Address::from_bytes(bytes);
        let decoded = round_trip(
            "address",
            Value::Address(addr),
            Slot::Address(Address::ZERO),
        );
        prop_assert_eq!(decoded, Slot::Address(addr));
    }

    #[test]
    fn bytes_round_trip(data: Vec<u8>) {
        let decoded = round_trip(
            "bytes",
            Value::Bytes(data.clone()),
            Slot::Bytes(Vec::new()),
        );
        prop_assert_eq!(decoded, Slot::Bytes(data));
    }

    #[test]
    fn string_round_trip(text: String) {
        let decoded = round_trip(
            "string",
            Value::String(text.clone()),
            Slot::Str(String::new()),
        );
        prop_assert_eq!(decoded, Slot::Str(text));
    }

    #[test]
    fn uint_array_round_trip(xs: Vec<u64>) {
        let args = [arg("uint64[]")];
        let values = [Value::Array(xs.iter().map(|x| Value::U64(*x)).collect())];
        let packed = pack_args(&args, &values).unwrap();
        prop_assert_eq!(packed.len() % 32, 0);

        let mut outs = [Slot::Array(Vec::new())];
        unpack(&args, &packed, &mut outs).unwrap();
        let expected: Vec<Slot> = xs.iter().map(|x| Slot::U64(*x)).collect();
        prop_assert_eq!(&outs[0], &Slot::Array(expected));
    }

    #[test]
    fn non_utf8_payload_decodes_to_bytes(data: Vec<u8>) {
        // A string-typed payload with arbitrary bytes always comes back
        // intact through a bytes destination
        let decoded = round_trip("string", Value::Bytes(data.clone()), Slot::Bytes(Vec::new()));
        prop_assert_eq!(decoded, Slot::Bytes(data));
    }

    #[test]
    fn array_as_string_equivalence(xs: Vec<u64>) {
        // Packing "[a,b,c]" equals packing the native list
        let args = [arg("uint256[]")];
        let literal = format!(
            "[{}]",
            xs.iter().map(|x| x.to_string()).collect::<Vec<_>>().join(",")
        );
        let from_string = pack_args(&args, &[Value::String(literal)]).unwrap();
        let from_list = pack_args(
            &args,
            &[Value::Array(xs.iter().map(|x| Value::U64(*x)).collect())],
        )
        .unwrap();
        prop_assert_eq!(from_string, from_list);
    }
}

#[test]
fn non_utf8_payload_decodes_to_string_lossily() {
    // The codec is byte-transparent: a contract may legally return bytes
    // that are not UTF-8 under a string tag
    let args = [arg("string")];
    let packed = pack_args(&args, &[Value::Bytes(vec![0x66, 0xFF, 0x6F])]).unwrap();

    let mut outs = [Slot::Str(String::new())];
    unpack(&args, &packed, &mut outs).unwrap();
    assert_eq!(outs[0], Slot::Str("f\u{FFFD}o".to_string()));
}
