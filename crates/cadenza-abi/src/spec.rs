//! Contract interface model
//!
//! An [`AbiSpec`] is built once from the contract's JSON description and is
//! read-only afterwards; it is safe to share across threads. Packing and
//! unpacking operate on the argument lists it holds.

use std::collections::HashMap;

use crate::element::ElemType;
use crate::encode;
use crate::error::AbiError;
use crate::schema;
use crate::value::Value;

/// Array modifier on an argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArrayKind {
    /// Scalar argument, no array suffix
    #[default]
    None,
    /// Fixed-length array `T[k]`
    Fixed(usize),
    /// Variable-length array `T[]`
    Dynamic,
}

/// One declared input or output of a function or event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    /// Declared parameter name (may be empty)
    pub name: String,
    /// The element type
    pub elem: ElemType,
    /// Array modifier
    pub array: ArrayKind,
    /// Whether an event parameter is indexed (events only)
    pub indexed: bool,
}

impl Argument {
    /// Create a scalar, non-indexed argument
    pub fn new(name: impl Into<String>, elem: ElemType) -> Self {
        Self {
            name: name.into(),
            elem,
            array: ArrayKind::None,
            indexed: false,
        }
    }

    /// Canonical signature fragment including the array suffix
    /// (`uint256[3]`, `string[]`, `bool`)
    pub fn type_signature(&self) -> String {
        let base = self.elem.signature();
        match self.array {
            ArrayKind::None => base,
            ArrayKind::Fixed(len) => format!("{}[{}]", base, len),
            ArrayKind::Dynamic => format!("{}[]", base),
        }
    }

    /// Whether the argument occupies an offset slot in the head
    ///
    /// Dynamic scalars and variable-length arrays do; fixed-length arrays
    /// route each element through its own head slot.
    pub fn is_dynamic(&self) -> bool {
        match self.array {
            ArrayKind::Dynamic => true,
            ArrayKind::Fixed(_) | ArrayKind::None => self.elem.is_dynamic(),
        }
    }
}

/// A callable function: input and output argument lists
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Function {
    /// Input arguments, in declaration order
    pub inputs: Vec<Argument>,
    /// Output arguments, in declaration order
    pub outputs: Vec<Argument>,
}

/// An event declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Event parameters, in declaration order
    pub inputs: Vec<Argument>,
    /// Whether the event was declared anonymous
    pub anonymous: bool,
}

/// A parsed contract interface
///
/// Functions and events are keyed by name; overloading is not modeled.
/// A contract without a declared constructor gets an empty-input one, so
/// constructor packing always works. A contract without a declared fallback
/// has none, and unknown function names fail.
#[derive(Debug, Clone, Default)]
pub struct AbiSpec {
    /// The constructor (empty inputs if not declared)
    pub constructor: Function,
    /// The fallback function, if declared
    pub fallback: Option<Function>,
    /// Named functions
    pub functions: HashMap<String, Function>,
    /// Named events
    pub events: HashMap<String, Event>,
}

impl AbiSpec {
    /// Parse a standard contract ABI JSON document
    pub fn from_json(json: &[u8]) -> Result<Self, AbiError> {
        schema::load_spec(json)
    }

    /// Look up a function by name
    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    /// Look up an event by name
    pub fn event(&self, name: &str) -> Option<&Event> {
        self.events.get(name)
    }

    /// Encode a call to the named function
    ///
    /// The empty name selects the constructor, whose encoding carries no
    /// selector. A name with no matching function uses the fallback when one
    /// is declared (zero arguments, selector over `name()`), and fails with
    /// [`AbiError::UnknownFunction`] otherwise.
    pub fn pack(&self, fname: &str, args: &[Value]) -> Result<Vec<u8>, AbiError> {
        let inputs = if fname.is_empty() {
            &self.constructor.inputs
        } else if let Some(function) = self.functions.get(fname) {
            &function.inputs
        } else if let Some(fallback) = &self.fallback {
            &fallback.inputs
        } else {
            return Err(AbiError::UnknownFunction(fname.to_string()));
        };
        encode::pack_call(fname, inputs, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_signature_with_array_suffix() {
        let scalar = Argument::new("x", ElemType::Uint(256));
        assert_eq!(scalar.type_signature(), "uint256");

        let fixed = Argument {
            array: ArrayKind::Fixed(3),
            ..Argument::new("xs", ElemType::Uint(256))
        };
        assert_eq!(fixed.type_signature(), "uint256[3]");

        let dynamic = Argument {
            array: ArrayKind::Dynamic,
            ..Argument::new("ss", ElemType::String)
        };
        assert_eq!(dynamic.type_signature(), "string[]");
    }

    #[test]
    fn test_argument_is_dynamic() {
        assert!(Argument::new("s", ElemType::String).is_dynamic());
        assert!(!Argument::new("n", ElemType::Uint(8)).is_dynamic());

        let dynamic_array = Argument {
            array: ArrayKind::Dynamic,
            ..Argument::new("ns", ElemType::Uint(8))
        };
        assert!(dynamic_array.is_dynamic());

        let fixed_array = Argument {
            array: ArrayKind::Fixed(2),
            ..Argument::new("ns", ElemType::Uint(8))
        };
        assert!(!fixed_array.is_dynamic());
    }

    #[test]
    fn test_pack_unknown_function_without_fallback() {
        let spec = AbiSpec::default();
        assert!(matches!(
            spec.pack("missing", &[]),
            Err(AbiError::UnknownFunction(_))
        ));
    }

    #[test]
    fn test_pack_unknown_function_with_fallback() {
        let spec = AbiSpec {
            fallback: Some(Function::default()),
            ..AbiSpec::default()
        };
        let packed = spec.pack("anything", &[]).unwrap();
        // Selector only: fallback takes no arguments
        assert_eq!(packed.len(), 4);
        // ...and rejects arguments
        assert!(matches!(
            spec.pack("anything", &[Value::U64(1)]),
            Err(AbiError::ArgumentCount { expected: 0, got: 1 })
        ));
    }

    #[test]
    fn test_missing_constructor_packs_empty() {
        let spec = AbiSpec::default();
        let packed = spec.pack("", &[]).unwrap();
        assert!(packed.is_empty());
    }
}
