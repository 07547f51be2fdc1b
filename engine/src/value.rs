//! Attribute values stored on tasks.
//!
//! Tasks carry a dynamic attribute bag keyed by field name. Each value is
//! tagged; the schema decides which tag a key should carry, but nothing here
//! enforces it. String conversion, numeric coercion and truthiness follow the
//! loose rules the filter and sort engines rely on.

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

use crate::FieldType;

/// Largest integer that survives an `f64` round trip exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// A single attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Free text
    Text(String),
    /// Numeric value
    Num(f64),
    /// Checkbox state
    Bool(bool),
    /// One entry of a single-select field's options
    Choice(String),
}

impl Value {
    /// Name of the tag, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Text(_) => "Text",
            Value::Num(_) => "Num",
            Value::Bool(_) => "Bool",
            Value::Choice(_) => "Choice",
        }
    }

    /// Borrow the string content of `Text` and `Choice` values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) | Value::Choice(s) => Some(s),
            _ => None,
        }
    }

    /// Coerce to a number.
    ///
    /// Blank text is `0`, booleans are `0`/`1`, anything unparsable is NaN.
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Num(n) => *n,
            Value::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::Text(s) | Value::Choice(s) => parse_number(s),
        }
    }

    /// Truthiness: empty strings, zero, NaN and `false` are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Text(s) | Value::Choice(s) => !s.is_empty(),
            Value::Num(n) => *n != 0.0 && !n.is_nan(),
            Value::Bool(b) => *b,
        }
    }

    /// Re-tag string values to match a field type.
    ///
    /// Only the `Text`/`Choice` distinction is adjusted; values of any other
    /// shape are kept as they are.
    pub fn conform(self, field_type: FieldType) -> Value {
        match (self, field_type) {
            (Value::Text(s), FieldType::SingleSelect) => Value::Choice(s),
            (Value::Choice(s), ft) if ft != FieldType::SingleSelect => Value::Text(s),
            (v, _) => v,
        }
    }
}

/// Parse a string the way a loose numeric cast does.
pub(crate) fn parse_number(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    // Rust accepts "inf" and "nan" spellings that a loose cast rejects.
    if trimmed
        .chars()
        .any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E')
    {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

/// Format a number without a trailing `.0` for integral values.
pub(crate) fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else if n == 0.0 {
        // Covers -0.0 as well.
        "0".to_string()
    } else {
        n.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) | Value::Choice(s) => f.write_str(s),
            Value::Num(n) => f.write_str(&format_number(*n)),
            Value::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Num(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Num(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Num(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl TryFrom<serde_json::Value> for Value {
    type Error = String;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        match value {
            serde_json::Value::String(s) => Ok(Value::Text(s)),
            serde_json::Value::Bool(b) => Ok(Value::Bool(b)),
            serde_json::Value::Number(n) => n
                .as_f64()
                .map(Value::Num)
                .ok_or_else(|| format!("number out of range: {}", n)),
            serde_json::Value::Null => Err("null is not an attribute value".to_string()),
            serde_json::Value::Array(_) => Err("arrays are not attribute values".to_string()),
            serde_json::Value::Object(_) => Err("objects are not attribute values".to_string()),
        }
    }
}

/// Non-finite numbers become `null`, as in [`Value`]'s `Serialize` impl.
impl From<&Value> for serde_json::Value {
    fn from(value: &Value) -> Self {
        match value {
            Value::Text(s) | Value::Choice(s) => serde_json::Value::String(s.clone()),
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Num(n) if is_safe_integer(*n) => serde_json::Value::from(*n as i64),
            Value::Num(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
        }
    }
}

fn is_safe_integer(n: f64) -> bool {
    n.is_finite() && n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER
}

/// Integral numbers are written as integers. NaN and the infinities have no
/// JSON form and are written as `null`, the same as `JSON.stringify`; since
/// `null` attributes are skipped on load, such a value does not survive a
/// save and restore.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Text(s) | Value::Choice(s) => serializer.serialize_str(s),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Num(n) if is_safe_integer(*n) => serializer.serialize_i64(*n as i64),
            Value::Num(n) => serializer.serialize_f64(*n),
        }
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string, number or boolean")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
        Ok(Value::Num(v as f64))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
        Ok(Value::Num(v as f64))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
        Ok(Value::Num(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
        Ok(Value::Text(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
        Ok(Value::Text(v))
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stringify_numbers() {
        assert_eq!(Value::Num(10.0).to_string(), "10");
        assert_eq!(Value::Num(2.5).to_string(), "2.5");
        assert_eq!(Value::Num(-0.0).to_string(), "0");
        assert_eq!(Value::Num(f64::NAN).to_string(), "NaN");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Choice("high".into()).to_string(), "high");
    }

    #[test]
    fn numeric_coercion() {
        assert_eq!(Value::from("  42 ").to_number(), 42.0);
        assert_eq!(Value::from("").to_number(), 0.0);
        assert_eq!(Value::from("1e3").to_number(), 1000.0);
        assert!(Value::from("abc").to_number().is_nan());
        assert!(Value::from("inf").to_number().is_nan());
        assert_eq!(Value::from("Infinity").to_number(), f64::INFINITY);
        assert_eq!(Value::Bool(true).to_number(), 1.0);
    }

    #[test]
    fn truthiness() {
        assert!(!Value::from("").is_truthy());
        assert!(Value::from("false").is_truthy());
        assert!(!Value::Num(0.0).is_truthy());
        assert!(!Value::Num(f64::NAN).is_truthy());
        assert!(Value::Num(-1.0).is_truthy());
        assert!(!Value::Bool(false).is_truthy());
    }

    #[test]
    fn conform_retags_strings_only() {
        assert_eq!(
            Value::from("high").conform(FieldType::SingleSelect),
            Value::Choice("high".into())
        );
        assert_eq!(
            Value::Choice("x".into()).conform(FieldType::Text),
            Value::Text("x".into())
        );
        assert_eq!(
            Value::Num(3.0).conform(FieldType::SingleSelect),
            Value::Num(3.0)
        );
    }

    #[test]
    fn json_shapes() {
        assert_eq!(serde_json::to_string(&Value::Num(3.0)).unwrap(), "3");
        assert_eq!(serde_json::to_string(&Value::Num(3.5)).unwrap(), "3.5");
        assert_eq!(
            serde_json::to_string(&Value::Choice("low".into())).unwrap(),
            "\"low\""
        );

        let parsed: Value = serde_json::from_str("true").unwrap();
        assert_eq!(parsed, Value::Bool(true));
        assert!(serde_json::from_str::<Value>("null").is_err());
        assert!(serde_json::from_str::<Value>("[1]").is_err());
    }

    #[test]
    fn try_from_json() {
        assert_eq!(
            Value::try_from(serde_json::json!(7)).unwrap(),
            Value::Num(7.0)
        );
        assert!(Value::try_from(serde_json::json!({"a": 1})).is_err());
    }
}
