//! Value Tests
//!
//! Tests for type codes, type names and value text.

use conftree::protocol::{Action, Value, ValueType};
use conftree::ConfTreeError;

// =============================================================================
// Type Code Tests
// =============================================================================

#[test]
fn test_type_codes() {
    let expected = [
        (ValueType::Bool, 0),
        (ValueType::Byte, 1),
        (ValueType::Short, 2),
        (ValueType::Int, 3),
        (ValueType::Long, 4),
        (ValueType::Float, 5),
        (ValueType::Double, 6),
        (ValueType::String, 7),
        (ValueType::Unknown, 0xFF),
    ];

    for (value_type, code) in expected {
        assert_eq!(value_type.code(), code);
        assert_eq!(ValueType::from_code(code), Some(value_type));
    }
}

#[test]
fn test_invalid_type_codes() {
    for code in [8u8, 9, 0x7F, 0xFE] {
        assert_eq!(ValueType::from_code(code), None);
    }
}

#[test]
fn test_action_codes() {
    for code in 0..=7u8 {
        let action = Action::from_code(code).unwrap();
        assert_eq!(action.code(), code);
    }
    assert_eq!(Action::from_code(8), None);
    assert_eq!(Action::from_code(0xFF), None);
}

#[test]
fn test_action_uses_type() {
    assert!(Action::AttrExists.uses_type());
    assert!(Action::Get.uses_type());
    assert!(Action::Put.uses_type());

    assert!(!Action::NodeExists.uses_type());
    assert!(!Action::GetChildren.uses_type());
    assert!(!Action::GetAttributes.uses_type());
    assert!(!Action::GetTypes.uses_type());
}

// =============================================================================
// Type Name Tests
// =============================================================================

#[test]
fn test_type_names() {
    for value_type in ValueType::CONCRETE {
        let name = value_type.name().unwrap();
        assert_eq!(ValueType::from_name(name), value_type);
        assert_eq!(value_type.to_string(), name);
    }
}

#[test]
fn test_unknown_type_name() {
    assert_eq!(ValueType::Unknown.name(), None);
    assert_eq!(ValueType::Unknown.to_string(), "unknown");
    assert!(!ValueType::Unknown.is_known());
}

#[test]
fn test_unrecognized_names_are_unknown() {
    for name in ["", "INT", "integer", "uint", "unknown", "char"] {
        assert_eq!(ValueType::from_name(name), ValueType::Unknown);
    }
}

// =============================================================================
// Value Parsing Tests
// =============================================================================

#[test]
fn test_parse_each_type() {
    assert_eq!(Value::parse(ValueType::Bool, "true").unwrap(), Value::Bool(true));
    assert_eq!(Value::parse(ValueType::Bool, "false").unwrap(), Value::Bool(false));
    assert_eq!(Value::parse(ValueType::Byte, "-128").unwrap(), Value::Byte(-128));
    assert_eq!(Value::parse(ValueType::Short, "30").unwrap(), Value::Short(30));
    assert_eq!(Value::parse(ValueType::Int, "5000").unwrap(), Value::Int(5000));
    assert_eq!(
        Value::parse(ValueType::Long, "9223372036854775807").unwrap(),
        Value::Long(i64::MAX)
    );
    assert_eq!(Value::parse(ValueType::Float, "1.5").unwrap(), Value::Float(1.5));
    assert_eq!(Value::parse(ValueType::Double, "0.25").unwrap(), Value::Double(0.25));
    assert_eq!(
        Value::parse(ValueType::String, "hello world").unwrap(),
        Value::String("hello world".to_string())
    );
}

#[test]
fn test_parse_bool_is_strict() {
    for text in ["1", "0", "TRUE", "yes", ""] {
        assert!(Value::parse(ValueType::Bool, text).is_err());
    }
}

#[test]
fn test_parse_out_of_range() {
    assert!(Value::parse(ValueType::Byte, "128").is_err());
    assert!(Value::parse(ValueType::Short, "40000").is_err());
    assert!(Value::parse(ValueType::Int, "2147483648").is_err());
}

#[test]
fn test_parse_error_carries_input() {
    match Value::parse(ValueType::Int, "abc") {
        Err(ConfTreeError::ValueFormat { value_type, value }) => {
            assert_eq!(value_type, ValueType::Int);
            assert_eq!(value, "abc");
        }
        other => panic!("expected ValueFormat, got {:?}", other),
    }
}

#[test]
fn test_parse_unknown_type_fails() {
    assert!(matches!(
        Value::parse(ValueType::Unknown, "1"),
        Err(ConfTreeError::ValueFormat { .. })
    ));
}

#[test]
fn test_empty_string_value() {
    let value = Value::parse(ValueType::String, "").unwrap();
    assert_eq!(value, Value::String(String::new()));
    assert_eq!(value.to_string(), "");
}

// =============================================================================
// Value Text Tests
// =============================================================================

#[test]
fn test_value_text() {
    assert_eq!(Value::Bool(true).to_string(), "true");
    assert_eq!(Value::Byte(-3).to_string(), "-3");
    assert_eq!(Value::Long(-1).to_string(), "-1");
    assert_eq!(Value::Float(1.5).to_string(), "1.5");
    assert_eq!(Value::Double(0.1).to_string(), "0.1");
}

#[test]
fn test_value_text_reparses() {
    let values = [
        Value::Bool(false),
        Value::Short(i16::MIN),
        Value::Int(42),
        Value::Float(3.25),
        Value::Double(-2.5e-8),
        Value::String("a b".to_string()),
    ];

    for value in values {
        let reparsed = Value::parse(value.value_type(), &value.to_string()).unwrap();
        assert_eq!(reparsed, value);
    }
}
