//! String-typed tabular results
//!
//! SHOW and DESCRIBE statements come back from Snowflake as rows of text.
//! [`Table`] is the in-memory shape of that output: named columns and rows of
//! optional string cells. The filter engine works entirely on these tables,
//! so the helpers here are projection, regex row filtering, and the
//! schema-aligning concat used to union SHOW output across object types.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Errors from table shape operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum TableError {
    #[error("column not found: {0}")]
    ColumnNotFound(String),

    #[error("row has {got} cells, expected {expected}")]
    ShapeMismatch { expected: usize, got: usize },
}

/// A tabular query result: named columns and rows of optional string cells
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl Table {
    /// Create a table, checking that every row matches the column count
    pub fn new(
        columns: Vec<String>,
        rows: Vec<Vec<Option<String>>>,
    ) -> Result<Self, TableError> {
        for row in &rows {
            if row.len() != columns.len() {
                return Err(TableError::ShapeMismatch {
                    expected: columns.len(),
                    got: row.len(),
                });
            }
        }
        Ok(Self { columns, rows })
    }

    /// A table with no columns and no rows
    pub fn empty() -> Self {
        Self::default()
    }

    /// Start building a table with the given column names
    pub fn builder<I, S>(columns: I) -> TableBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TableBuilder {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// True when the table holds no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a named column
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All cells of a named column, in row order
    pub fn column_values(&self, name: &str) -> Result<Vec<Option<&str>>, TableError> {
        let idx = self
            .column_index(name)
            .ok_or_else(|| TableError::ColumnNotFound(name.to_string()))?;
        Ok(self.rows.iter().map(|row| row[idx].as_deref()).collect())
    }

    /// The top-left cell, if any
    ///
    /// GRANT/ALTER/CREATE statements and GET_DDL return a single status or
    /// text cell; this is how callers read it.
    pub fn first_value(&self) -> Option<&str> {
        self.rows.first().and_then(|row| row.first()).and_then(|c| c.as_deref())
    }

    /// Project the table onto a subset of its columns, in the given order
    pub fn select(&self, names: &[&str]) -> Result<Table, TableError> {
        let indices = names
            .iter()
            .map(|name| {
                self.column_index(name)
                    .ok_or_else(|| TableError::ColumnNotFound(name.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
            .collect();

        Ok(Table {
            columns: names.iter().map(|s| s.to_string()).collect(),
            rows,
        })
    }

    /// Rename a column
    pub fn rename(mut self, from: &str, to: &str) -> Result<Table, TableError> {
        let idx = self
            .column_index(from)
            .ok_or_else(|| TableError::ColumnNotFound(from.to_string()))?;
        self.columns[idx] = to.to_string();
        Ok(self)
    }

    /// Append a column holding the same value in every row
    pub fn with_column(mut self, name: impl Into<String>, value: impl Into<String>) -> Table {
        let value = value.into();
        self.columns.push(name.into());
        for row in &mut self.rows {
            row.push(Some(value.clone()));
        }
        self
    }

    /// Rewrite the cells of a column through a function
    pub fn map_column<F>(mut self, name: &str, f: F) -> Result<Table, TableError>
    where
        F: Fn(&str) -> String,
    {
        let idx = self
            .column_index(name)
            .ok_or_else(|| TableError::ColumnNotFound(name.to_string()))?;
        for row in &mut self.rows {
            if let Some(cell) = row[idx].take() {
                row[idx] = Some(f(&cell));
            }
        }
        Ok(self)
    }

    /// Keep rows whose cell in `column` matches the pattern
    ///
    /// Substring search semantics: the pattern may match anywhere in the
    /// cell. Null cells never match.
    pub fn retain_matching(&self, column: &str, pattern: &Regex) -> Result<Table, TableError> {
        self.filter_rows(column, |cell| matches!(cell, Some(c) if pattern.is_match(c)))
    }

    /// Drop rows whose cell in `column` matches the pattern
    pub fn discard_matching(&self, column: &str, pattern: &Regex) -> Result<Table, TableError> {
        self.filter_rows(column, |cell| !matches!(cell, Some(c) if pattern.is_match(c)))
    }

    fn filter_rows<F>(&self, column: &str, keep: F) -> Result<Table, TableError>
    where
        F: Fn(Option<&str>) -> bool,
    {
        let idx = self
            .column_index(column)
            .ok_or_else(|| TableError::ColumnNotFound(column.to_string()))?;
        let rows = self
            .rows
            .iter()
            .filter(|row| keep(row[idx].as_deref()))
            .cloned()
            .collect();
        Ok(Table {
            columns: self.columns.clone(),
            rows,
        })
    }

    /// Schema-aligning union of tables
    ///
    /// The output column set is the union of the input columns in first-seen
    /// order. Rows are realigned by column name; cells for columns an input
    /// lacks are null. Concatenating nothing yields the empty table.
    pub fn concat<I>(tables: I) -> Table
    where
        I: IntoIterator<Item = Table>,
    {
        let tables: Vec<Table> = tables.into_iter().collect();

        let mut columns: Vec<String> = Vec::new();
        for table in &tables {
            for col in &table.columns {
                if !columns.contains(col) {
                    columns.push(col.clone());
                }
            }
        }

        let mut rows = Vec::new();
        for table in tables {
            let mapping: Vec<Option<usize>> =
                columns.iter().map(|c| table.column_index(c)).collect();
            for row in table.rows {
                rows.push(
                    mapping
                        .iter()
                        .map(|idx| idx.and_then(|i| row[i].clone()))
                        .collect(),
                );
            }
        }

        Table { columns, rows }
    }
}

/// Row-at-a-time construction, mostly for tests and mock sessions
pub struct TableBuilder {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl TableBuilder {
    /// Append a row of non-null cells
    pub fn row<I, S>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows
            .push(cells.into_iter().map(|c| Some(c.into())).collect());
        self
    }

    pub fn build(self) -> Result<Table, TableError> {
        Table::new(self.columns, self.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Table {
        Table::builder(["database_name", "schema_name", "name"])
            .row(["ANALYTICS", "PUBLIC", "CUSTOMER"])
            .row(["ANALYTICS", "STAGING", "ORDERS"])
            .row(["SNOWFLAKE", "INFORMATION_SCHEMA", "TABLES"])
            .build()
            .unwrap()
    }

    #[test]
    fn builder_shapes_rows() {
        let table = sample();
        assert_eq!(table.columns(), ["database_name", "schema_name", "name"]);
        assert_eq!(table.num_rows(), 3);
        assert_eq!(table.first_value(), Some("ANALYTICS"));
    }

    #[test]
    fn ragged_rows_rejected() {
        let result = Table::new(
            vec!["a".into(), "b".into()],
            vec![vec![Some("1".into())]],
        );
        assert!(matches!(
            result,
            Err(TableError::ShapeMismatch { expected: 2, got: 1 })
        ));
    }

    #[test]
    fn select_projects_and_orders() {
        let projected = sample().select(&["name", "database_name"]).unwrap();
        assert_eq!(projected.columns(), ["name", "database_name"]);
        assert_eq!(
            projected.rows()[0],
            vec![Some("CUSTOMER".to_string()), Some("ANALYTICS".to_string())]
        );
    }

    #[test]
    fn select_unknown_column_errors() {
        let err = sample().select(&["nope"]).unwrap_err();
        assert!(matches!(err, TableError::ColumnNotFound(name) if name == "nope"));
    }

    #[test]
    fn retain_is_substring_search() {
        let pattern = Regex::new("ANALYT").unwrap();
        let kept = sample().retain_matching("database_name", &pattern).unwrap();
        assert_eq!(kept.num_rows(), 2);
    }

    #[test]
    fn discard_drops_matches() {
        let pattern = Regex::new("SNOWFLAKE").unwrap();
        let kept = sample().discard_matching("database_name", &pattern).unwrap();
        assert_eq!(kept.num_rows(), 2);
        assert!(kept
            .column_values("database_name")
            .unwrap()
            .iter()
            .all(|v| *v == Some("ANALYTICS")));
    }

    #[test]
    fn null_cells_never_match() {
        let table = Table::new(
            vec!["name".into()],
            vec![vec![None], vec![Some("X".into())]],
        )
        .unwrap();
        let all = Regex::new(".*").unwrap();
        assert_eq!(table.retain_matching("name", &all).unwrap().num_rows(), 1);
        // Discard keeps the null row: it did not match.
        assert_eq!(table.discard_matching("name", &all).unwrap().num_rows(), 1);
    }

    #[test]
    fn rename_and_constant_column() {
        let table = sample()
            .rename("name", "object_name")
            .unwrap()
            .with_column("object_type", "TABLE");
        assert_eq!(
            table.columns(),
            ["database_name", "schema_name", "object_name", "object_type"]
        );
        assert_eq!(
            table.column_values("object_type").unwrap(),
            vec![Some("TABLE"); 3]
        );
    }

    #[test]
    fn map_column_rewrites_cells() {
        let table = Table::builder(["name"])
            .row(["ADD(A NUMBER, B NUMBER) RETURN NUMBER"])
            .build()
            .unwrap()
            .map_column("name", |v| v.split(" RETURN ").next().unwrap_or(v).to_string())
            .unwrap();
        assert_eq!(table.first_value(), Some("ADD(A NUMBER, B NUMBER)"));
    }

    #[test]
    fn concat_aligns_columns_by_name() {
        let left = Table::builder(["database_name", "name"])
            .row(["DB1", "T1"])
            .build()
            .unwrap();
        let right = Table::builder(["name", "arguments"])
            .row(["F1", "F1(X NUMBER)"])
            .build()
            .unwrap();

        let unioned = Table::concat([left, right]);
        assert_eq!(unioned.columns(), ["database_name", "name", "arguments"]);
        assert_eq!(
            unioned.rows()[0],
            vec![Some("DB1".to_string()), Some("T1".to_string()), None]
        );
        assert_eq!(
            unioned.rows()[1],
            vec![None, Some("F1".to_string()), Some("F1(X NUMBER)".to_string())]
        );
    }

    #[test]
    fn concat_of_nothing_is_empty() {
        let unioned = Table::concat(Vec::<Table>::new());
        assert!(unioned.is_empty());
        assert!(unioned.columns().is_empty());
    }
}
