//! Scalar values carried by filters.

use serde::{Deserialize, Serialize};

/// A filter value as stored in canonical filters and sent on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Null value.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// String value.
    String(String),
    /// List of values.
    List(Vec<FilterValue>),
    /// Any other JSON value (objects).
    Json(serde_json::Value),
    /// A value intentionally withheld because its expression failed to evaluate.
    ///
    /// Never read back from storage. Serializes as `null` inside lists and is
    /// left out entirely when it is the value of a wire operator.
    #[serde(skip_deserializing)]
    Withheld,
}

impl FilterValue {
    /// Check if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Check if this value was withheld.
    pub fn is_withheld(&self) -> bool {
        matches!(self, Self::Withheld)
    }

    /// Check if this value, or any value nested in it, was withheld.
    pub fn contains_withheld(&self) -> bool {
        match self {
            Self::Withheld => true,
            Self::List(items) => items.iter().any(Self::contains_withheld),
            _ => false,
        }
    }

    /// Borrow the string contents, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Text shown to users in filter summaries.
    pub fn display_text(&self) -> String {
        match self {
            Self::Null | Self::Withheld => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::String(s) => s.clone(),
            Self::List(items) => items
                .iter()
                .map(Self::display_text)
                .collect::<Vec<_>>()
                .join(", "),
            Self::Json(v) => v.to_string(),
        }
    }
}

impl From<bool> for FilterValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for FilterValue {
    fn from(v: i32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<i64> for FilterValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for FilterValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl<T: Into<FilterValue>> From<Vec<T>> for FilterValue {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<FilterValue>> From<Option<T>> for FilterValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }
}

impl From<serde_json::Value> for FilterValue {
    fn from(v: serde_json::Value) -> Self {
        use serde_json::Value;
        match v {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => n.as_f64().map(Self::Float).unwrap_or(Self::Null),
            },
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            other @ Value::Object(_) => Self::Json(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_untagged_deserialize() {
        let v: FilterValue = serde_json::from_value(json!(3)).unwrap();
        assert_eq!(v, FilterValue::Int(3));
        let v: FilterValue = serde_json::from_value(json!(1.5)).unwrap();
        assert_eq!(v, FilterValue::Float(1.5));
        let v: FilterValue = serde_json::from_value(json!(["a", 1])).unwrap();
        assert_eq!(v, FilterValue::List(vec!["a".into(), 1.into()]));
        let v: FilterValue = serde_json::from_value(json!({"k": 1})).unwrap();
        assert!(matches!(v, FilterValue::Json(_)));
        let v: FilterValue = serde_json::from_value(json!(null)).unwrap();
        assert!(v.is_null());
    }

    #[test]
    fn test_withheld_serializes_as_null_in_lists() {
        let v = FilterValue::List(vec!["2024-01-01".into(), FilterValue::Withheld]);
        assert!(v.contains_withheld());
        assert_eq!(serde_json::to_value(&v).unwrap(), json!(["2024-01-01", null]));
    }

    #[test]
    fn test_from_json_value() {
        assert_eq!(FilterValue::from(json!(true)), FilterValue::Bool(true));
        assert_eq!(FilterValue::from(json!(-4)), FilterValue::Int(-4));
        assert_eq!(FilterValue::from(json!([1, "x"])), FilterValue::from(vec![
            FilterValue::Int(1),
            FilterValue::from("x")
        ]));
    }

    #[test]
    fn test_display_text() {
        assert_eq!(FilterValue::from(vec![1, 2, 3]).display_text(), "1, 2, 3");
        assert_eq!(FilterValue::Withheld.display_text(), "");
        assert_eq!(FilterValue::from(2.5).display_text(), "2.5");
    }
}
