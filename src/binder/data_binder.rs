//! The named-value store bound methods read their parameters from.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use crate::binder::error::Result;
use crate::date_format::DateFormat;

/// Read-only view of a request scoped key/value store.
pub trait Binder: Send + Sync + Debug {
    /// The scalar stored under `name`, if any.
    fn get_local(&self, name: &str) -> Option<String>;

    /// Names of every scalar in the store, sorted.
    fn local_names(&self) -> Vec<String>;

    /// The tabular result stored under `name`, if any.
    fn get_result_set(&self, name: &str) -> Option<Arc<ResultSet>>;

    /// The date pattern this store's date values are written in.
    fn date_format(&self) -> &DateFormat;
}

/// A named table of string cells.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet {
    fields: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl ResultSet {
    pub fn new(fields: Vec<String>) -> Self {
        ResultSet {
            fields,
            rows: Vec::new(),
        }
    }

    pub fn with_row(mut self, row: Vec<String>) -> Self {
        self.add_row(row);
        self
    }

    /// Append a row. Short rows are padded with empty cells.
    pub fn add_row(&mut self, mut row: Vec<String>) {
        row.resize(self.fields.len(), String::new());
        self.rows.push(row);
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn get_value(&self, row: usize, field: &str) -> Option<&str> {
        let column = self.fields.iter().position(|f| f == field)?;
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(|s| s.as_str())
    }
}

/// In-memory store.
#[derive(Debug, Clone)]
pub struct DataBinder {
    locals: HashMap<String, String>,
    result_sets: HashMap<String, Arc<ResultSet>>,
    date_format: DateFormat,
}

impl DataBinder {
    /// A store using the default date pattern.
    pub fn new() -> Self {
        DataBinder::with_format(DateFormat::default())
    }

    pub fn with_format(date_format: DateFormat) -> Self {
        DataBinder {
            locals: HashMap::new(),
            result_sets: HashMap::new(),
            date_format,
        }
    }

    /// A store whose dates are written in `pattern`.
    pub fn with_date_pattern(pattern: &str) -> Result<Self> {
        Ok(DataBinder::with_format(DateFormat::compile(pattern)?))
    }

    pub fn put_local(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.locals.insert(name.into(), value.into());
    }

    pub fn remove_local(&mut self, name: &str) -> Option<String> {
        self.locals.remove(name)
    }

    pub fn add_result_set(&mut self, name: impl Into<String>, result_set: ResultSet) {
        self.result_sets.insert(name.into(), Arc::new(result_set));
    }
}

impl Default for DataBinder {
    fn default() -> Self {
        Self::new()
    }
}

impl Binder for DataBinder {
    fn get_local(&self, name: &str) -> Option<String> {
        self.locals.get(name).cloned()
    }

    fn local_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.locals.keys().cloned().collect();
        names.sort();
        names
    }

    fn get_result_set(&self, name: &str) -> Option<Arc<ResultSet>> {
        self.result_sets.get(name).cloned()
    }

    fn date_format(&self) -> &DateFormat {
        &self.date_format
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locals() {
        let mut binder = DataBinder::new();
        binder.put_local("dDocName", "TEST_DOC");
        assert_eq!(binder.get_local("dDocName"), Some("TEST_DOC".to_string()));
        binder.put_local("dID", "42");
        assert_eq!(binder.local_names(), vec!["dDocName".to_string(), "dID".to_string()]);
        assert_eq!(binder.remove_local("dDocName"), Some("TEST_DOC".to_string()));
        assert_eq!(binder.get_local("dDocName"), None);
    }

    #[test]
    fn test_result_set_lookup() {
        let rs = ResultSet::new(vec!["dID".to_string(), "dDocName".to_string()])
            .with_row(vec!["1".to_string(), "A".to_string()])
            .with_row(vec!["2".to_string()]);
        let mut binder = DataBinder::new();
        binder.add_result_set("DOC_INFO", rs);

        let found = binder.get_result_set("DOC_INFO").unwrap();
        assert_eq!(found.num_rows(), 2);
        assert_eq!(found.get_value(0, "dDocName"), Some("A"));
        assert_eq!(found.get_value(1, "dDocName"), Some(""));
        assert_eq!(found.get_value(0, "missing"), None);
        assert!(binder.get_result_set("OTHER").is_none());
    }

    #[test]
    fn test_custom_date_pattern() {
        let binder = DataBinder::with_date_pattern("yyyy-MM-dd").unwrap();
        assert_eq!(binder.date_format().pattern(), "yyyy-MM-dd");
        assert!(DataBinder::with_date_pattern("yyyy-QQ").is_err());
    }
}
