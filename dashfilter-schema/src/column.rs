//! Column definitions for filterable datasets.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Semantic column types understood by the filter engine.
///
/// Unknown type names are kept as [`ColumnType::Unsupported`] so that a
/// dataset can still be loaded; the operator catalog rejects them when a
/// filter is built against such a column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ColumnType {
    /// Short string (maps to VARCHAR).
    String,
    /// Long text.
    Text,
    /// UUID identifier, filtered as a string.
    Uuid,
    /// JSON document, filtered as a string.
    Json,
    /// Enumerated value, filtered as a string.
    Enum,
    /// Array column, filtered as a string.
    Array,
    /// 32-bit integer.
    Int,
    /// 16-bit integer.
    SmallInt,
    /// 64-bit integer.
    BigInt,
    /// Single precision float.
    Float,
    /// Double precision float.
    Double,
    /// Arbitrary precision decimal.
    Decimal,
    /// Boolean.
    Boolean,
    /// Calendar date.
    Date,
    /// Time of day.
    Time,
    /// Date and time.
    DateTime,
    /// Timestamp (date and time with zone).
    Timestamp,
    /// A type this crate does not know how to filter.
    Unsupported(SmolStr),
}

/// Filtering category of a column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnCategory {
    /// String and string-like identifier/structural types.
    StringLike,
    /// Integer and decimal families.
    Numeric,
    /// Date, time, datetime and timestamp.
    Temporal,
    /// Boolean.
    Boolean,
}

/// The representation a temporal column is filtered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemporalKind {
    /// Date only (`YYYY-MM-DD`).
    Date,
    /// Time only (`HH:MM:SS`).
    Time,
    /// Full zoned date and time.
    #[serde(alias = "date-time", alias = "date_time")]
    DateTime,
}

impl ColumnType {
    /// Parse a column type from its name (case-insensitive).
    ///
    /// Never fails: unknown names become [`ColumnType::Unsupported`].
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "string" | "varchar" | "char" => Self::String,
            "text" => Self::Text,
            "uuid" | "id" => Self::Uuid,
            "json" | "jsonb" => Self::Json,
            "enum" => Self::Enum,
            "array" => Self::Array,
            "int" | "integer" | "int4" => Self::Int,
            "smallint" | "int2" => Self::SmallInt,
            "bigint" | "int8" | "long" => Self::BigInt,
            "float" | "real" | "float4" => Self::Float,
            "double" | "float8" => Self::Double,
            "decimal" | "numeric" => Self::Decimal,
            "boolean" | "bool" => Self::Boolean,
            "date" => Self::Date,
            "time" => Self::Time,
            "datetime" => Self::DateTime,
            "timestamp" | "timestamptz" => Self::Timestamp,
            _ => Self::Unsupported(SmolStr::new(s)),
        }
    }

    /// Get the canonical type name.
    pub fn as_str(&self) -> &str {
        match self {
            Self::String => "string",
            Self::Text => "text",
            Self::Uuid => "uuid",
            Self::Json => "json",
            Self::Enum => "enum",
            Self::Array => "array",
            Self::Int => "int",
            Self::SmallInt => "smallint",
            Self::BigInt => "bigint",
            Self::Float => "float",
            Self::Double => "double",
            Self::Decimal => "decimal",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Time => "time",
            Self::DateTime => "datetime",
            Self::Timestamp => "timestamp",
            Self::Unsupported(name) => name.as_str(),
        }
    }

    /// Get the filtering category, or `None` for unsupported types.
    pub fn category(&self) -> Option<ColumnCategory> {
        match self {
            Self::String | Self::Text | Self::Uuid | Self::Json | Self::Enum | Self::Array => {
                Some(ColumnCategory::StringLike)
            }
            Self::Int
            | Self::SmallInt
            | Self::BigInt
            | Self::Float
            | Self::Double
            | Self::Decimal => Some(ColumnCategory::Numeric),
            Self::Date | Self::Time | Self::DateTime | Self::Timestamp => {
                Some(ColumnCategory::Temporal)
            }
            Self::Boolean => Some(ColumnCategory::Boolean),
            Self::Unsupported(_) => None,
        }
    }

    /// Check if this is a temporal type.
    pub fn is_temporal(&self) -> bool {
        self.category() == Some(ColumnCategory::Temporal)
    }

    /// Check if this is a numeric type.
    pub fn is_numeric(&self) -> bool {
        self.category() == Some(ColumnCategory::Numeric)
    }

    /// Check if this is an integer type.
    pub fn is_integer(&self) -> bool {
        matches!(self, Self::Int | Self::SmallInt | Self::BigInt)
    }
}

impl From<String> for ColumnType {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<&str> for ColumnType {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<ColumnType> for String {
    fn from(t: ColumnType) -> Self {
        t.as_str().to_string()
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A dataset column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name as referenced by filters.
    pub name: String,
    /// Semantic type.
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    /// Display format; only consulted for datetime and timestamp columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<TemporalKind>,
    /// Display alias.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl Column {
    /// Create a new column.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            format: None,
            alias: None,
        }
    }

    /// Set the display format.
    pub fn with_format(mut self, format: TemporalKind) -> Self {
        self.format = Some(format);
        self
    }

    /// Set the display alias.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// The name shown to users: the alias when set, otherwise the column name.
    pub fn display_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    /// How values of this column are represented when filtering by time.
    ///
    /// Returns `None` for non-temporal columns.
    pub fn temporal_kind(&self) -> Option<TemporalKind> {
        match self.column_type {
            ColumnType::Date => Some(TemporalKind::Date),
            ColumnType::Time => Some(TemporalKind::Time),
            ColumnType::DateTime | ColumnType::Timestamp => {
                Some(self.format.unwrap_or(TemporalKind::DateTime))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_types() {
        assert_eq!(ColumnType::parse("Integer"), ColumnType::Int);
        assert_eq!(ColumnType::parse("timestamptz"), ColumnType::Timestamp);
        assert_eq!(ColumnType::parse("UUID"), ColumnType::Uuid);
    }

    #[test]
    fn test_parse_unknown_type() {
        let t = ColumnType::parse("geometry");
        assert_eq!(t, ColumnType::Unsupported("geometry".into()));
        assert_eq!(t.category(), None);
        assert_eq!(t.as_str(), "geometry");
    }

    #[test]
    fn test_identifier_types_are_string_like() {
        for t in [ColumnType::Uuid, ColumnType::Json, ColumnType::Enum, ColumnType::Array] {
            assert_eq!(t.category(), Some(ColumnCategory::StringLike));
        }
    }

    #[test]
    fn test_temporal_kind_uses_format_for_datetime_only() {
        let dt = Column::new("at", ColumnType::DateTime).with_format(TemporalKind::Date);
        assert_eq!(dt.temporal_kind(), Some(TemporalKind::Date));

        let date = Column::new("day", ColumnType::Date).with_format(TemporalKind::Time);
        assert_eq!(date.temporal_kind(), Some(TemporalKind::Date));

        let ts = Column::new("ts", ColumnType::Timestamp);
        assert_eq!(ts.temporal_kind(), Some(TemporalKind::DateTime));

        let name = Column::new("name", ColumnType::String);
        assert_eq!(name.temporal_kind(), None);
    }

    #[test]
    fn test_column_serde() {
        let column: Column =
            serde_json::from_str(r#"{"name":"createdAt","type":"datetime","alias":"Created"}"#)
                .unwrap();
        assert_eq!(column.column_type, ColumnType::DateTime);
        assert_eq!(column.display_name(), "Created");

        let json = serde_json::to_value(&column).unwrap();
        assert_eq!(json["type"], "datetime");
    }
}
