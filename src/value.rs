use std::fmt::{self, Display};

use chrono::{NaiveDate, NaiveDateTime};
use ordered_float::NotNan;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A bound parameter value. The transpiler never inspects it; it only moves
/// it along with the placeholder it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(NotNan<f64>),
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Uuid(Uuid),
}

impl SqlValue {
    /// Float value; NaN has no SQL representation and becomes `Null`.
    pub fn float(value: f64) -> Self {
        NotNan::new(value).map(SqlValue::Float).unwrap_or(SqlValue::Null)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }
}

impl Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => f.write_str("NULL"),
            SqlValue::Bool(b) => write!(f, "{}", b),
            SqlValue::Int(i) => write!(f, "{}", i),
            SqlValue::Float(n) => write!(f, "{}", n.into_inner()),
            SqlValue::Text(s) => write!(f, "\"{}\"", s),
            SqlValue::Date(d) => write!(f, "{}", d),
            SqlValue::DateTime(dt) => write!(f, "{}", dt),
            SqlValue::Uuid(u) => write!(f, "{}", u),
        }
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self { SqlValue::Bool(value) }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self { SqlValue::Int(value.into()) }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self { SqlValue::Int(value) }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self { SqlValue::float(value) }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self { SqlValue::Text(value.to_string()) }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self { SqlValue::Text(value) }
}

impl From<NaiveDate> for SqlValue {
    fn from(value: NaiveDate) -> Self { SqlValue::Date(value) }
}

impl From<NaiveDateTime> for SqlValue {
    fn from(value: NaiveDateTime) -> Self { SqlValue::DateTime(value) }
}

impl From<Uuid> for SqlValue {
    fn from(value: Uuid) -> Self { SqlValue::Uuid(value) }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(SqlValue::Null)
    }
}

/// JSON scalars map onto their SQL counterparts; arrays and objects are bound
/// as their JSON text.
impl From<&serde_json::Value> for SqlValue {
    fn from(value: &serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => SqlValue::Null,
            Value::Bool(b) => SqlValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => SqlValue::Int(i),
                None => n.as_f64().map(SqlValue::float).unwrap_or(SqlValue::Null),
            },
            Value::String(s) => SqlValue::Text(s.clone()),
            Value::Array(_) | Value::Object(_) => SqlValue::Text(value.to_string()),
        }
    }
}

impl From<serde_json::Value> for SqlValue {
    fn from(value: serde_json::Value) -> Self {
        SqlValue::from(&value)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde_json::json;

    use crate::SqlValue;

    #[test]
    fn test_from_json() {
        assert_eq!(SqlValue::from(json!(null)), SqlValue::Null);
        assert_eq!(SqlValue::from(json!(true)), SqlValue::Bool(true));
        assert_eq!(SqlValue::from(json!(10)), SqlValue::Int(10));
        assert_eq!(SqlValue::from(json!(2.5)), SqlValue::float(2.5));
        assert_eq!(SqlValue::from(json!("abc")), SqlValue::Text("abc".into()));
        assert_eq!(SqlValue::from(json!([1, 2])), SqlValue::Text("[1,2]".into()));
    }

    #[test]
    fn test_nan_is_null() {
        assert!(SqlValue::float(f64::NAN).is_null());
    }

    #[test]
    fn test_from_option() {
        assert_eq!(SqlValue::from(None::<i64>), SqlValue::Null);
        assert_eq!(SqlValue::from(Some("x")), SqlValue::Text("x".into()));
    }

    #[test]
    fn test_serde_roundtrip_shape() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 31).expect("valid date");

        let encoded = serde_json::to_value(SqlValue::Date(date)).expect("Failed to serialize");

        assert_eq!(encoded, json!({ "type": "date", "value": "2024-01-31" }));
    }

    #[test]
    fn test_display() {
        assert_eq!(SqlValue::Int(7).to_string(), "7");
        assert_eq!(SqlValue::Text("a".into()).to_string(), "\"a\"");
        assert_eq!(SqlValue::Null.to_string(), "NULL");
    }
}
