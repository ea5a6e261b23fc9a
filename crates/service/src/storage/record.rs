use std::fmt;

use serde::{Deserialize, Serialize};

use super::StorageError;

/// Name of the dynamic type a record belongs to.
pub type TypeTag = &'static str;

/// Anything a store can hold.
///
/// A store accepts records of a single [`TypeTag`] at a time: the first record
/// inserted into an empty store fixes the tag until the store is empty again.
pub trait Record: Clone + PartialEq + fmt::Debug + Send + Sync + 'static {
    fn type_tag(&self) -> TypeTag;
}

/// Dynamically typed record for stores that take mixed client input.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Record for Value {
    fn type_tag(&self) -> TypeTag {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self { Value::Bool(v) }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self { Value::Int(v) }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self { Value::Int(v.into()) }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self { Value::Float(v) }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self { Value::Text(v.to_string()) }
}

impl From<String> for Value {
    fn from(v: String) -> Self { Value::Text(v) }
}

impl Record for models::Note {
    fn type_tag(&self) -> TypeTag { "note" }
}

impl Record for i64 {
    fn type_tag(&self) -> TypeTag { "int" }
}

/// Reject `value` when the store already holds records of another type.
pub(crate) fn check_type<V: Record>(established: Option<TypeTag>, value: &V) -> Result<(), StorageError> {
    match established {
        Some(expected) if expected != value.type_tag() => Err(StorageError::TypeMismatch {
            expected,
            found: value.type_tag(),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_tags_follow_variant() {
        assert_eq!(Value::from("a").type_tag(), "text");
        assert_eq!(Value::from(42).type_tag(), "int");
        assert_eq!(Value::from(1.5).type_tag(), "float");
        assert_eq!(Value::from(true).type_tag(), "bool");
    }

    #[test]
    fn untagged_value_parses_plain_json() {
        let vals: Vec<Value> = serde_json::from_str(r#"[1, "x", true, 2.5]"#).unwrap();
        assert_eq!(vals, vec![Value::Int(1), Value::from("x"), Value::Bool(true), Value::Float(2.5)]);
    }

    #[test]
    fn check_type_only_fails_on_established_mismatch() {
        assert!(check_type(None, &Value::from(1)).is_ok());
        assert!(check_type(Some("int"), &Value::from(1)).is_ok());
        let err = check_type(Some("text"), &Value::from(1)).unwrap_err();
        assert_eq!(err, StorageError::TypeMismatch { expected: "text", found: "int" });
    }
}
