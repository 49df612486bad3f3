//! Tests for the Redis reply parsers
//!
//! Command round-trips need a live server; what can go wrong locally
//! is the hand-rolled TS.MRANGE decoding, so that is what gets pinned
//! down here.

use redis::Value;

use super::*;

fn bulk(s: &str) -> Value {
    Value::BulkString(s.as_bytes().to_vec())
}

#[test]
fn test_parse_mrange_full_reply() {
    let reply = Value::Array(vec![Value::Array(vec![
        bulk("ts:error"),
        Value::Array(vec![
            Value::Array(vec![bulk("log_level"), bulk("error")]),
            Value::Array(vec![bulk("type"), bulk("logs")]),
        ]),
        Value::Array(vec![
            Value::Array(vec![Value::Int(1000), bulk("2")]),
            Value::Array(vec![Value::Int(2000), bulk("5")]),
        ]),
    ])]);

    let series = parse_mrange(reply).unwrap();
    assert_eq!(series.len(), 1);
    assert_eq!(series[0].name, "error");
    assert_eq!(
        series[0].data,
        vec![SamplePoint { x: 1000, y: 2.0 }, SamplePoint { x: 2000, y: 5.0 }]
    );
}

#[test]
fn test_parse_mrange_falls_back_to_key_name() {
    let reply = Value::Array(vec![Value::Array(vec![
        bulk("ts:custom"),
        Value::Array(vec![]),
        Value::Array(vec![Value::Array(vec![Value::Int(0), Value::Double(1.5)])]),
    ])]);

    let series = parse_mrange(reply).unwrap();
    assert_eq!(series[0].name, "ts:custom");
    assert_eq!(series[0].data, vec![SamplePoint { x: 0, y: 1.5 }]);
}

#[test]
fn test_parse_mrange_rejects_non_array() {
    assert!(parse_mrange(Value::Int(3)).is_err());
}

#[test]
fn test_parse_mrange_empty() {
    let series = parse_mrange(Value::Array(vec![])).unwrap();
    assert!(series.is_empty());
}

#[test]
fn test_value_coercions() {
    assert_eq!(value_string(&bulk("hi")), Some("hi".to_string()));
    assert_eq!(value_string(&Value::Int(7)), Some("7".to_string()));
    assert_eq!(value_i64(&bulk("42")), Some(42));
    assert_eq!(value_f64(&Value::Double(2.5)), Some(2.5));
    assert_eq!(value_f64(&bulk("3.25")), Some(3.25));
    assert_eq!(value_string(&Value::Nil), None);
}
