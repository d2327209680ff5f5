// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// The value of a single event attribute.
///
/// The set of variants is closed on purpose: the backend schema only knows
/// about strings, booleans, 64-bit integers and floats, plus an explicit null
/// for attributes whose source could not provide a value.
///
/// Build floats through `From`, which maps non-finite values to `Null`; a
/// `Float` holding NaN or an infinity serializes as JSON `null` anyway.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    String(String),
    Bool(bool),
    Int(i64),
    Float(f64),
    Null,
}

impl AttributeValue {
    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttributeValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Float(f) => Some(*f),
            AttributeValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }
}

impl Display for AttributeValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeValue::String(s) => f.write_str(s),
            AttributeValue::Bool(b) => write!(f, "{b}"),
            AttributeValue::Int(i) => write!(f, "{i}"),
            AttributeValue::Float(v) => write!(f, "{v}"),
            AttributeValue::Null => f.write_str("null"),
        }
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::String(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::String(value.to_owned())
    }
}

impl From<&String> for AttributeValue {
    fn from(value: &String) -> Self {
        AttributeValue::String(value.clone())
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

macro_rules! impl_from_lossless_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for AttributeValue {
                fn from(value: $t) -> Self {
                    AttributeValue::Int(i64::from(value))
                }
            }
        )*
    };
}

impl_from_lossless_int!(i8, i16, i32, i64, u8, u16, u32);

/// NaN and the infinities have no JSON representation and become
/// [`AttributeValue::Null`].
impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        if value.is_finite() {
            AttributeValue::Float(value)
        } else {
            AttributeValue::Null
        }
    }
}

impl From<f32> for AttributeValue {
    fn from(value: f32) -> Self {
        AttributeValue::from(f64::from(value))
    }
}

impl<T> From<Option<T>> for AttributeValue
where
    T: Into<AttributeValue>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(AttributeValue::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_conversions() {
        assert_eq!(AttributeValue::from("a"), AttributeValue::String("a".into()));
        assert_eq!(AttributeValue::from(true), AttributeValue::Bool(true));
        assert_eq!(AttributeValue::from(42u32), AttributeValue::Int(42));
        assert_eq!(AttributeValue::from(-7i32), AttributeValue::Int(-7));
        assert_eq!(AttributeValue::from(1.5f64), AttributeValue::Float(1.5));
        assert_eq!(AttributeValue::from(None::<String>), AttributeValue::Null);
        assert_eq!(
            AttributeValue::from(Some("x")),
            AttributeValue::String("x".into())
        );
    }

    #[test]
    fn test_non_finite_floats_become_null() {
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert_eq!(AttributeValue::from(value), AttributeValue::Null);
        }
        assert_eq!(AttributeValue::from(f32::NAN), AttributeValue::Null);
        assert_eq!(AttributeValue::from(0.25f32), AttributeValue::Float(0.25));
        assert_eq!(
            serde_json::to_value(AttributeValue::from(f64::NAN)).unwrap(),
            serde_json::Value::Null
        );
    }

    #[test]
    fn test_serializes_untagged() {
        let values = vec![
            AttributeValue::from("phone"),
            AttributeValue::from(false),
            AttributeValue::from(480i64),
            AttributeValue::from(2.5),
            AttributeValue::Null,
        ];
        let serialized = serde_json::to_value(&values).unwrap();
        assert_eq!(serialized, json!(["phone", false, 480, 2.5, null]));
    }

    #[test]
    fn test_deserializes_numbers_to_narrowest_variant() {
        let values: Vec<AttributeValue> =
            serde_json::from_value(json!([1, 1.25, "1", null, true])).unwrap();
        assert_eq!(
            values,
            vec![
                AttributeValue::Int(1),
                AttributeValue::Float(1.25),
                AttributeValue::String("1".into()),
                AttributeValue::Null,
                AttributeValue::Bool(true),
            ]
        );
    }

    #[test]
    fn test_accessors() {
        assert_eq!(AttributeValue::from("v").as_str(), Some("v"));
        assert_eq!(AttributeValue::from(3i64).as_f64(), Some(3.0));
        assert_eq!(AttributeValue::from(3i64).as_str(), None);
        assert!(AttributeValue::Null.is_null());
        assert_eq!(AttributeValue::from(true).to_string(), "true");
    }
}
