//! Operator catalog: which operators each column type admits, and their titles.

use std::fmt;

use dashfilter_schema::{Column, ColumnCategory, ColumnType, Dataset};
use serde::{Deserialize, Serialize};

use crate::error::{FilterError, FilterResult};

/// Comparison operators, named as they appear on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "$eq")]
    Eq,
    #[serde(rename = "$ne")]
    Ne,
    #[serde(rename = "$gt")]
    Gt,
    #[serde(rename = "$gte")]
    Gte,
    #[serde(rename = "$lt")]
    Lt,
    #[serde(rename = "$lte")]
    Lte,
    #[serde(rename = "$between")]
    Between,
    #[serde(rename = "$startsWith")]
    StartsWith,
    #[serde(rename = "$endsWith")]
    EndsWith,
    #[serde(rename = "$contains")]
    Contains,
    #[serde(rename = "$containsi")]
    ContainsCi,
    #[serde(rename = "$notContains")]
    NotContains,
    #[serde(rename = "$notContainsi")]
    NotContainsCi,
    #[serde(rename = "$in")]
    In,
    #[serde(rename = "$notIn")]
    NotIn,
    #[serde(rename = "$null")]
    IsNull,
    #[serde(rename = "$notNull")]
    IsNotNull,
}

const STRING_OPERATORS: &[Operator] = &[
    Operator::Eq,
    Operator::Ne,
    Operator::StartsWith,
    Operator::EndsWith,
    Operator::Contains,
    Operator::ContainsCi,
    Operator::NotContains,
    Operator::NotContainsCi,
    Operator::In,
    Operator::NotIn,
    Operator::IsNull,
    Operator::IsNotNull,
];

const NUMERIC_OPERATORS: &[Operator] = &[
    Operator::Eq,
    Operator::Ne,
    Operator::Gt,
    Operator::Gte,
    Operator::Lt,
    Operator::Lte,
    Operator::Between,
    Operator::In,
    Operator::NotIn,
    Operator::IsNull,
    Operator::IsNotNull,
];

const TEMPORAL_OPERATORS: &[Operator] = &[
    Operator::Eq,
    Operator::Ne,
    Operator::Gt,
    Operator::Gte,
    Operator::Lt,
    Operator::Lte,
    Operator::Between,
    Operator::IsNull,
    Operator::IsNotNull,
];

const BOOLEAN_OPERATORS: &[Operator] = &[
    Operator::Eq,
    Operator::Ne,
    Operator::IsNull,
    Operator::IsNotNull,
];

impl Operator {
    /// All operators.
    pub const ALL: [Operator; 17] = [
        Operator::Eq,
        Operator::Ne,
        Operator::Gt,
        Operator::Gte,
        Operator::Lt,
        Operator::Lte,
        Operator::Between,
        Operator::StartsWith,
        Operator::EndsWith,
        Operator::Contains,
        Operator::ContainsCi,
        Operator::NotContains,
        Operator::NotContainsCi,
        Operator::In,
        Operator::NotIn,
        Operator::IsNull,
        Operator::IsNotNull,
    ];

    /// The wire name of the operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "$eq",
            Self::Ne => "$ne",
            Self::Gt => "$gt",
            Self::Gte => "$gte",
            Self::Lt => "$lt",
            Self::Lte => "$lte",
            Self::Between => "$between",
            Self::StartsWith => "$startsWith",
            Self::EndsWith => "$endsWith",
            Self::Contains => "$contains",
            Self::ContainsCi => "$containsi",
            Self::NotContains => "$notContains",
            Self::NotContainsCi => "$notContainsi",
            Self::In => "$in",
            Self::NotIn => "$notIn",
            Self::IsNull => "$null",
            Self::IsNotNull => "$notNull",
        }
    }

    /// Parse a wire name.
    pub fn from_wire(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == s)
    }

    /// Display title used in filter summaries.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Between => "between",
            Self::StartsWith => "starts with",
            Self::EndsWith => "ends with",
            Self::Contains => "contains",
            Self::ContainsCi => "contains (case-insensitive)",
            Self::NotContains => "does not contain",
            Self::NotContainsCi => "does not contain (case-insensitive)",
            Self::In => "in",
            Self::NotIn => "not in",
            Self::IsNull => "null",
            Self::IsNotNull => "not null",
        }
    }

    /// Check if the operator carries no operand.
    pub fn is_null_check(&self) -> bool {
        matches!(self, Self::IsNull | Self::IsNotNull)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a block combines its children.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalOp {
    #[default]
    #[serde(rename = "AND", alias = "and")]
    And,
    #[serde(rename = "OR", alias = "or")]
    Or,
}

impl LogicalOp {
    /// Display title used to join summary items.
    pub fn title(&self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::And => "AND",
            Self::Or => "OR",
        })
    }
}

/// Operators comparing a column with one operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    StartsWith,
    EndsWith,
    Contains,
    ContainsCi,
    NotContains,
    NotContainsCi,
}

impl CompareOp {
    /// Equality and ordering comparisons, whose operand is converted for temporal columns.
    pub fn is_single_value_comparison(&self) -> bool {
        matches!(
            self,
            Self::Eq | Self::Ne | Self::Gt | Self::Gte | Self::Lt | Self::Lte
        )
    }
}

impl From<CompareOp> for Operator {
    fn from(op: CompareOp) -> Self {
        match op {
            CompareOp::Eq => Operator::Eq,
            CompareOp::Ne => Operator::Ne,
            CompareOp::Gt => Operator::Gt,
            CompareOp::Gte => Operator::Gte,
            CompareOp::Lt => Operator::Lt,
            CompareOp::Lte => Operator::Lte,
            CompareOp::StartsWith => Operator::StartsWith,
            CompareOp::EndsWith => Operator::EndsWith,
            CompareOp::Contains => Operator::Contains,
            CompareOp::ContainsCi => Operator::ContainsCi,
            CompareOp::NotContains => Operator::NotContains,
            CompareOp::NotContainsCi => Operator::NotContainsCi,
        }
    }
}

impl TryFrom<Operator> for CompareOp {
    type Error = Operator;

    fn try_from(op: Operator) -> Result<Self, Self::Error> {
        Ok(match op {
            Operator::Eq => Self::Eq,
            Operator::Ne => Self::Ne,
            Operator::Gt => Self::Gt,
            Operator::Gte => Self::Gte,
            Operator::Lt => Self::Lt,
            Operator::Lte => Self::Lte,
            Operator::StartsWith => Self::StartsWith,
            Operator::EndsWith => Self::EndsWith,
            Operator::Contains => Self::Contains,
            Operator::ContainsCi => Self::ContainsCi,
            Operator::NotContains => Self::NotContains,
            Operator::NotContainsCi => Self::NotContainsCi,
            other => return Err(other),
        })
    }
}

/// List membership operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListOp {
    In,
    NotIn,
}

impl From<ListOp> for Operator {
    fn from(op: ListOp) -> Self {
        match op {
            ListOp::In => Operator::In,
            ListOp::NotIn => Operator::NotIn,
        }
    }
}

/// Operators a column of the given type admits.
pub fn operators_for(column_type: &ColumnType) -> FilterResult<&'static [Operator]> {
    match column_type.category() {
        Some(ColumnCategory::StringLike) => Ok(STRING_OPERATORS),
        Some(ColumnCategory::Numeric) => Ok(NUMERIC_OPERATORS),
        Some(ColumnCategory::Temporal) => Ok(TEMPORAL_OPERATORS),
        Some(ColumnCategory::Boolean) => Ok(BOOLEAN_OPERATORS),
        None => Err(FilterError::illegal_type(column_type.as_str())),
    }
}

/// Look up the column a filter references.
pub fn lookup_column<'d>(dataset: &'d Dataset, name: &str) -> FilterResult<&'d Column> {
    dataset
        .column(name)
        .ok_or_else(|| FilterError::column_not_found(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn supported_types() -> Vec<ColumnType> {
        [
            "string", "text", "uuid", "json", "enum", "array", "int", "smallint", "bigint",
            "float", "double", "decimal", "boolean", "date", "time", "datetime", "timestamp",
        ]
        .into_iter()
        .map(ColumnType::parse)
        .collect()
    }

    #[test]
    fn test_every_supported_type_has_operators() {
        for t in supported_types() {
            let ops = operators_for(&t).unwrap();
            assert!(!ops.is_empty(), "{t} has no operators");
            assert!(ops.contains(&Operator::IsNull));
            assert!(ops.contains(&Operator::IsNotNull));
        }
    }

    #[test]
    fn test_no_list_operators_for_temporal_or_boolean() {
        for t in supported_types() {
            if t.is_temporal() || t == ColumnType::Boolean {
                let ops = operators_for(&t).unwrap();
                assert!(!ops.contains(&Operator::In), "{t} admits $in");
                assert!(!ops.contains(&Operator::NotIn), "{t} admits $notIn");
            }
        }
    }

    #[test]
    fn test_category_subsets() {
        let string_ops = operators_for(&ColumnType::Text).unwrap();
        assert!(string_ops.contains(&Operator::ContainsCi));
        assert!(!string_ops.contains(&Operator::Between));

        let numeric_ops = operators_for(&ColumnType::Decimal).unwrap();
        assert!(numeric_ops.contains(&Operator::Between));
        assert!(numeric_ops.contains(&Operator::In));
        assert!(!numeric_ops.contains(&Operator::Contains));

        assert_eq!(operators_for(&ColumnType::Boolean).unwrap().len(), 4);
    }

    #[test]
    fn test_unsupported_type_is_illegal() {
        let err = operators_for(&ColumnType::parse("geometry")).unwrap_err();
        assert_eq!(err.code, ErrorCode::IllegalType);
    }

    #[test]
    fn test_wire_names_round_trip() {
        for op in Operator::ALL {
            assert_eq!(Operator::from_wire(op.as_str()), Some(op));
            let json = serde_json::to_value(op).unwrap();
            assert_eq!(json, op.as_str());
            assert!(!op.title().is_empty());
        }
        assert_eq!(Operator::from_wire("$like"), None);
    }

    #[test]
    fn test_logical_op_serde() {
        let op: LogicalOp = serde_json::from_str("\"or\"").unwrap();
        assert_eq!(op, LogicalOp::Or);
        assert_eq!(serde_json::to_string(&LogicalOp::And).unwrap(), "\"AND\"");
        assert_eq!(LogicalOp::Or.title(), "or");
    }

    #[test]
    fn test_compare_op_conversion() {
        assert_eq!(CompareOp::try_from(Operator::Gte), Ok(CompareOp::Gte));
        assert_eq!(CompareOp::try_from(Operator::In), Err(Operator::In));
        assert!(CompareOp::Lt.is_single_value_comparison());
        assert!(!CompareOp::Contains.is_single_value_comparison());
    }
}
