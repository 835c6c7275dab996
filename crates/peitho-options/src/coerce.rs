//! Built-in type coercers.
//!
//! Each coercer converts one raw input value to its declared type, recording
//! a soft error on the bag when the input cannot be converted. Null always
//! passes through unchanged; absence never reaches a coercer (it is handled
//! by the default/required rules first).

use crate::option::OptionSpec;
use crate::registry::{CoerceFn, TypeRegistry};
use bytes::Bytes;
use peitho_core::{Value, ValueBag};
use std::sync::Arc;

/// Registers the built-in types on `registry`.
pub(crate) fn install_builtins(registry: &TypeRegistry) {
    registry.register_types([
        ("boolean".to_string(), Arc::new(boolean) as CoerceFn),
        ("string".to_string(), Arc::new(string) as CoerceFn),
        ("number".to_string(), Arc::new(number) as CoerceFn),
        ("integer".to_string(), Arc::new(integer) as CoerceFn),
        ("buffer".to_string(), Arc::new(buffer) as CoerceFn),
        ("object".to_string(), Arc::new(object) as CoerceFn),
    ]);
}

/// `""` → null, `"true"`/`"false"` (any case) → bool, numbers compare
/// against zero; anything else records a soft error.
fn boolean(value: Value, spec: &OptionSpec, bag: &mut ValueBag) -> Value {
    match value {
        Value::Null => Value::Null,
        Value::Bool(b) => Value::Bool(b),
        Value::Int(n) => Value::Bool(n != 0),
        Value::Float(x) => Value::Bool(x != 0.0),
        Value::String(s) => {
            if s.is_empty() {
                Value::Null
            } else if s.eq_ignore_ascii_case("true") {
                Value::Bool(true)
            } else if s.eq_ignore_ascii_case("false") {
                Value::Bool(false)
            } else {
                bag.add_error(&spec.name, format!("Invalid boolean: {s}"));
                Value::Null
            }
        }
        other => {
            bag.add_error(&spec.name, format!("Invalid boolean: {other}"));
            Value::Null
        }
    }
}

/// Stringifies the input; honors `empty_null` and the case-folding
/// directives.
fn string(value: Value, spec: &OptionSpec, _bag: &mut ValueBag) -> Value {
    if value.is_null() {
        return Value::Null;
    }

    let s = value.to_string();
    if s.is_empty() {
        if spec.empty_null {
            return Value::Null;
        }
        return Value::String(s);
    }

    let s = if spec.force_lower_case {
        s.to_lowercase()
    } else if spec.force_upper_case {
        s.to_uppercase()
    } else {
        s
    };
    Value::String(s)
}

/// Parses strings as floats; numeric inputs pass through.
fn number(value: Value, spec: &OptionSpec, bag: &mut ValueBag) -> Value {
    match value {
        Value::Null => Value::Null,
        Value::Int(_) | Value::Float(_) => value,
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(x) => Value::Float(x),
            Err(_) => {
                bag.add_error(&spec.name, format!("Invalid number: {s}"));
                Value::Null
            }
        },
        other => {
            bag.add_error(&spec.name, format!("Invalid number: {other}"));
            Value::Null
        }
    }
}

/// Parses strings as base-10 integers; integers pass through, floats
/// truncate toward zero.
fn integer(value: Value, spec: &OptionSpec, bag: &mut ValueBag) -> Value {
    match value {
        Value::Null => Value::Null,
        Value::Int(_) => value,
        Value::Float(x) => Value::Int(x as i64),
        Value::String(s) => match s.trim().parse::<i64>() {
            Ok(n) => Value::Int(n),
            Err(_) => {
                bag.add_error(&spec.name, format!("Invalid integer: {s}"));
                Value::Null
            }
        },
        other => {
            bag.add_error(&spec.name, format!("Invalid integer: {other}"));
            Value::Null
        }
    }
}

/// Raw binary passes through; text and scalars UTF-8 encode.
fn buffer(value: Value, spec: &OptionSpec, bag: &mut ValueBag) -> Value {
    match value {
        Value::Null => Value::Null,
        Value::Bytes(_) => value,
        Value::String(s) => Value::Bytes(Bytes::from(s)),
        Value::Bool(_) | Value::Int(_) | Value::Float(_) => {
            Value::Bytes(Bytes::from(value.to_string()))
        }
        other => {
            bag.add_error(&spec.name, format!("Invalid buffer: {other}"));
            Value::Null
        }
    }
}

/// Structured payloads pass through unchanged.
fn object(value: Value, _spec: &OptionSpec, _bag: &mut ValueBag) -> Value {
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceKind;

    fn spec(name: &str) -> OptionSpec {
        OptionSpec {
            name: name.to_string(),
            property: name.to_string(),
            target_property: name.to_string(),
            property_not_name: false,
            source: SourceKind::Path,
            type_name: None,
            coerce: None,
            array: false,
            required: false,
            default: None,
            empty_null: false,
            force_lower_case: false,
            force_upper_case: false,
            limit: None,
            header: None,
        }
    }

    #[test]
    fn test_boolean_strings() {
        let s = spec("flag");
        let mut bag = ValueBag::new();

        assert_eq!(boolean(Value::from(""), &s, &mut bag), Value::Null);
        assert_eq!(boolean(Value::from("true"), &s, &mut bag), Value::Bool(true));
        assert_eq!(boolean(Value::from("FALSE"), &s, &mut bag), Value::Bool(false));
        assert!(!bag.has_errors());

        assert_eq!(boolean(Value::from("yes"), &s, &mut bag), Value::Null);
        assert_eq!(bag.errors()[0].message, "Invalid boolean: yes");
    }

    #[test]
    fn test_boolean_non_strings() {
        let s = spec("flag");
        let mut bag = ValueBag::new();

        assert_eq!(boolean(Value::Bool(true), &s, &mut bag), Value::Bool(true));
        assert_eq!(boolean(Value::Int(0), &s, &mut bag), Value::Bool(false));
        assert_eq!(boolean(Value::Int(2), &s, &mut bag), Value::Bool(true));
        assert!(!bag.has_errors());
    }

    #[test]
    fn test_null_passes_through_every_coercer() {
        let s = spec("x");
        let mut bag = ValueBag::new();

        for coercer in [boolean, string, number, integer, buffer, object] {
            assert_eq!(coercer(Value::Null, &s, &mut bag), Value::Null);
        }
        assert!(!bag.has_errors());
    }

    #[test]
    fn test_string_directives() {
        let mut bag = ValueBag::new();

        let mut s = spec("name");
        s.empty_null = true;
        assert_eq!(string(Value::from(""), &s, &mut bag), Value::Null);

        let mut s = spec("name");
        s.force_lower_case = true;
        assert_eq!(string(Value::from("MiXeD"), &s, &mut bag), Value::from("mixed"));

        let mut s = spec("name");
        s.force_upper_case = true;
        assert_eq!(string(Value::from("abc"), &s, &mut bag), Value::from("ABC"));

        // numbers stringify
        let s = spec("name");
        assert_eq!(string(Value::Int(7), &s, &mut bag), Value::from("7"));
        assert!(!bag.has_errors());
    }

    #[test]
    fn test_number_parse_and_errors() {
        let s = spec("score");
        let mut bag = ValueBag::new();

        assert_eq!(number(Value::from("1.5"), &s, &mut bag), Value::Float(1.5));
        assert_eq!(number(Value::Int(3), &s, &mut bag), Value::Int(3));
        assert_eq!(number(Value::from("abc"), &s, &mut bag), Value::Null);
        assert_eq!(bag.errors()[0].option, "score");
        assert_eq!(bag.errors()[0].message, "Invalid number: abc");
    }

    #[test]
    fn test_integer_parse_and_errors() {
        let s = spec("count");
        let mut bag = ValueBag::new();

        assert_eq!(integer(Value::from("42"), &s, &mut bag), Value::Int(42));
        assert_eq!(integer(Value::Float(3.9), &s, &mut bag), Value::Int(3));
        assert_eq!(integer(Value::from("4.2"), &s, &mut bag), Value::Null);
        assert_eq!(bag.errors()[0].message, "Invalid integer: 4.2");
    }

    #[test]
    fn test_buffer_encoding() {
        let s = spec("blob");
        let mut bag = ValueBag::new();

        let raw = Value::Bytes(Bytes::from_static(b"\x00\x01"));
        assert_eq!(buffer(raw.clone(), &s, &mut bag), raw);
        assert_eq!(
            buffer(Value::from("text"), &s, &mut bag),
            Value::Bytes(Bytes::from_static(b"text"))
        );
        assert!(!bag.has_errors());

        assert_eq!(buffer(Value::Array(vec![]), &s, &mut bag), Value::Null);
        assert!(bag.has_errors());
    }

    #[test]
    fn test_object_passthrough() {
        let s = spec("payload");
        let mut bag = ValueBag::new();
        let obj = Value::from(serde_json::json!({"a": 1}));

        assert_eq!(object(obj.clone(), &s, &mut bag), obj);
        assert!(!bag.has_errors());
    }
}
