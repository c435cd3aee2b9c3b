//! Dataset column maps.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::column::Column;
use crate::error::{SchemaError, SchemaResult};

/// A dataset and the columns filters may reference.
///
/// Columns keep their declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DatasetFile", into = "DatasetFile")]
pub struct Dataset {
    name: String,
    columns: IndexMap<String, Column>,
}

/// On-disk shape: columns as a list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct DatasetFile {
    #[serde(default)]
    name: String,
    #[serde(default)]
    columns: Vec<Column>,
}

impl Dataset {
    /// Create an empty dataset.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: IndexMap::new(),
        }
    }

    /// Add a column, replacing any column with the same name.
    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.insert(column.name.clone(), column);
        self
    }

    /// Build a dataset from a list of columns, rejecting duplicates.
    pub fn from_columns(
        name: impl Into<String>,
        columns: impl IntoIterator<Item = Column>,
    ) -> SchemaResult<Self> {
        let name = name.into();
        let mut map = IndexMap::new();
        for column in columns {
            if map.contains_key(&column.name) {
                return Err(SchemaError::duplicate_column(&name, &column.name));
            }
            map.insert(column.name.clone(), column);
        }
        Ok(Self { name, columns: map })
    }

    /// Get the dataset name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    /// Iterate over the columns in declaration order.
    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.values()
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Check if the dataset has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Parse a dataset from JSON.
    pub fn from_json_str(content: &str) -> SchemaResult<Self> {
        let file: DatasetFile = serde_json::from_str(content)?;
        file.try_into()
    }

    /// Parse a dataset from TOML.
    pub fn from_toml_str(content: &str) -> SchemaResult<Self> {
        let file: DatasetFile = toml::from_str(content)?;
        file.try_into()
    }

    /// Parse a dataset read from `path`, choosing the format by its extension.
    pub fn from_str_with_ext(content: &str, path: &Path) -> SchemaResult<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(content),
            Some("toml") => Self::from_toml_str(content),
            _ => Err(SchemaError::UnsupportedFormat {
                path: path.display().to_string(),
            }),
        }
    }

    /// Load a dataset from a `.json` or `.toml` file.
    pub fn from_file(path: impl AsRef<Path>) -> SchemaResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| SchemaError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        let dataset = Self::from_str_with_ext(&content, path)?;

        tracing::debug!(
            dataset = %dataset.name,
            columns = dataset.len(),
            path = %path.display(),
            "Loaded dataset"
        );
        Ok(dataset)
    }
}

impl TryFrom<DatasetFile> for Dataset {
    type Error = SchemaError;

    fn try_from(file: DatasetFile) -> Result<Self, Self::Error> {
        Self::from_columns(file.name, file.columns)
    }
}

impl From<Dataset> for DatasetFile {
    fn from(dataset: Dataset) -> Self {
        Self {
            name: dataset.name,
            columns: dataset.columns.into_values().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{ColumnType, TemporalKind};
    use std::io::Write;

    #[test]
    fn test_from_json() {
        let dataset = Dataset::from_json_str(
            r#"{
                "name": "orders",
                "columns": [
                    {"name": "id", "type": "bigint"},
                    {"name": "createdAt", "type": "datetime", "format": "date"}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(dataset.name(), "orders");
        assert_eq!(dataset.len(), 2);
        let created = dataset.column("createdAt").unwrap();
        assert_eq!(created.format, Some(TemporalKind::Date));
        let names: Vec<_> = dataset.columns().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["id", "createdAt"]);
    }

    #[test]
    fn test_from_str_with_ext() {
        let json = r#"{"name": "d", "columns": [{"name": "a", "type": "int"}]}"#;
        let dataset = Dataset::from_str_with_ext(json, Path::new("d.json")).unwrap();
        assert_eq!(dataset.len(), 1);

        let toml = "name = \"d\"\n[[columns]]\nname = \"a\"\ntype = \"int\"\n";
        assert_eq!(
            Dataset::from_str_with_ext(toml, Path::new("d.toml")).unwrap(),
            dataset
        );

        for path in ["d.yaml", "d"] {
            assert!(matches!(
                Dataset::from_str_with_ext(json, Path::new(path)),
                Err(SchemaError::UnsupportedFormat { .. })
            ));
        }
    }

    #[test]
    fn test_from_toml() {
        let dataset = Dataset::from_toml_str(
            r#"
                name = "people"

                [[columns]]
                name = "age"
                type = "int"

                [[columns]]
                name = "name"
                type = "string"
                alias = "Full name"
            "#,
        )
        .unwrap();

        assert_eq!(dataset.column("age").unwrap().column_type, ColumnType::Int);
        assert_eq!(dataset.column("name").unwrap().display_name(), "Full name");
    }

    #[test]
    fn test_duplicate_column() {
        let err = Dataset::from_json_str(
            r#"{"name": "d", "columns": [{"name": "a", "type": "int"}, {"name": "a", "type": "text"}]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("duplicate column"));
    }

    #[test]
    fn test_from_file_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"name": "t", "columns": [{{"name": "flag", "type": "bool"}}]}}"#).unwrap();

        let dataset = Dataset::from_file(file.path()).unwrap();
        assert_eq!(dataset.column("flag").unwrap().column_type, ColumnType::Boolean);

        let other = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        assert!(matches!(
            Dataset::from_file(other.path()),
            Err(SchemaError::UnsupportedFormat { .. })
        ));
    }
}
