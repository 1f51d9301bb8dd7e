//! Typed values carried by filter parameters and compared against entity fields.

use std::fmt;

use uuid::Uuid;

/// Declared type of a filter parameter or entity field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ValueKind {
    Bool,
    I64,
    String,
    Uuid,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Bool => write!(f, "Bool"),
            ValueKind::I64 => write!(f, "I64"),
            ValueKind::String => write!(f, "String"),
            ValueKind::Uuid => write!(f, "Uuid"),
        }
    }
}

/// A parameter binding or a field value read from an entity.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Value {
    Null,
    Bool(bool),
    I64(i64),
    String(String),
    Uuid(Uuid),
}

impl Value {
    /// Kind of a non-null value.
    #[must_use]
    pub fn kind(&self) -> Option<ValueKind> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(ValueKind::Bool),
            Value::I64(_) => Some(ValueKind::I64),
            Value::String(_) => Some(ValueKind::String),
            Value::Uuid(_) => Some(ValueKind::Uuid),
        }
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Bool",
            Value::I64(_) => "I64",
            Value::String(_) => "String",
            Value::Uuid(_) => "Uuid",
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[must_use]
    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            Value::Uuid(u) => Some(*u),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Coerce a JSON configuration value into a value of `kind`.
    ///
    /// Returns `None` when the JSON value cannot represent `kind`.
    pub(crate) fn from_json(kind: ValueKind, json: &serde_json::Value) -> Option<Self> {
        if json.is_null() {
            return Some(Value::Null);
        }
        match kind {
            ValueKind::Bool => json.as_bool().map(Value::Bool),
            ValueKind::I64 => json.as_i64().map(Value::I64),
            ValueKind::String => json.as_str().map(|s| Value::String(s.to_owned())),
            ValueKind::Uuid => json
                .as_str()
                .and_then(|s| Uuid::parse_str(s).ok())
                .map(Value::Uuid),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::I64(i) => write!(f, "{i}"),
            Value::String(s) => write!(f, "'{s}'"),
            Value::Uuid(u) => write!(f, "{u}"),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::I64(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::I64(i64::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn option_maps_to_null() {
        let none: Option<Uuid> = None;
        assert_eq!(Value::from(none), Value::Null);
        let id = Uuid::new_v4();
        assert_eq!(Value::from(Some(id)), Value::Uuid(id));
    }

    #[test]
    fn json_coercion_follows_declared_kind() {
        let id = Uuid::new_v4();
        assert_eq!(
            Value::from_json(ValueKind::Uuid, &serde_json::json!(id.to_string())),
            Some(Value::Uuid(id))
        );
        assert_eq!(
            Value::from_json(ValueKind::Uuid, &serde_json::json!("not-a-uuid")),
            None
        );
        assert_eq!(
            Value::from_json(ValueKind::I64, &serde_json::json!(true)),
            None
        );
        assert_eq!(
            Value::from_json(ValueKind::Bool, &serde_json::Value::Null),
            Some(Value::Null)
        );
    }
}
