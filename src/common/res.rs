//! Types representing results.

use crate::common::*;

/// A benchmark observation: column name to raw value, exactly as read.
pub type Row = Map<String, String>;

/// Typed access to the raw values of a row.
pub trait RowExt {
    /// Raw value of a column, `None` if the column is absent or empty.
    fn field(&self, column: &str) -> Option<&str>;
    /// Numeric value of a column, `None` if the column is absent or empty.
    fn num(&self, column: &str) -> Res<Option<f64>> {
        if let Some(txt) = self.field(column) {
            f64::from_str(txt.trim()).map(Some).map_err(|_| {
                format!("value `{}` of column `{}` is not a number", txt, column).into()
            })
        } else {
            Ok(None)
        }
    }
}
impl RowExt for Row {
    fn field(&self, column: &str) -> Option<&str> {
        self.get(column)
            .map(|s| s.as_str())
            .filter(|s| !s.trim().is_empty())
    }
}

/// A source file that was loaded.
#[derive(Debug, Clone)]
pub struct Source {
    /// Path to the file.
    pub path: PathBuf,
    /// Number of rows loaded from it.
    pub rows: usize,
    /// Its columns.
    pub columns: Set<String>,
}

/// A source file that was skipped.
#[derive(Debug)]
pub struct Skipped {
    /// Path to the file.
    pub path: PathBuf,
    /// Reason.
    pub err: Error,
}

/// The rows of all the sources of a result directory.
///
/// Row order is unspecified, everything downstream groups by key.
#[derive(Debug, Default)]
pub struct ResultTable {
    /// Union of the columns of the sources loaded.
    pub columns: Set<String>,
    /// Rows.
    pub rows: Vec<Row>,
    /// Sources loaded.
    pub sources: Vec<Source>,
    /// Sources skipped.
    pub skipped: Vec<Skipped>,
}
impl ResultTable {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }
    /// True if there are no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
    /// Number of source files discovered, loaded or not.
    #[inline]
    pub fn file_count(&self) -> usize {
        self.sources.len() + self.skipped.len()
    }

    /// Adds the rows of a source.
    pub fn push_source(&mut self, path: PathBuf, columns: Set<String>, mut rows: Vec<Row>) {
        self.columns.extend(columns.iter().cloned());
        self.sources.push(Source {
            path,
            rows: rows.len(),
            columns,
        });
        self.rows.append(&mut rows)
    }

    /// Registers a source that could not be loaded.
    pub fn push_skipped(&mut self, path: PathBuf, err: Error) {
        self.skipped.push(Skipped { path, err })
    }

    /// True if the table has a column.
    #[inline]
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.contains(column)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn row_access() {
        let r = row(&[("time", " 1.5 "), ("stop_val", ""), ("solver_name", "ADMM")]);
        assert_eq!(r.num("time").unwrap(), Some(1.5));
        assert_eq!(r.num("stop_val").unwrap(), None);
        assert_eq!(r.num("nope").unwrap(), None);
        assert!(r.num("solver_name").is_err());
        assert_eq!(r.field("solver_name"), Some("ADMM"));
        assert_eq!(r.field("stop_val"), None)
    }

    #[test]
    fn push_source_unions_columns() {
        let mut table = ResultTable::new();
        let cols = |cs: &[&str]| cs.iter().map(|c| c.to_string()).collect::<Set<_>>();
        table.push_source(
            "a.csv".into(),
            cols(&["time", "solver_name"]),
            vec![row(&[("time", "1")]), row(&[("time", "2")])],
        );
        table.push_source(
            "b.csv".into(),
            cols(&["time", "objective_value"]),
            vec![row(&[("time", "3")])],
        );
        table.push_skipped("c.csv".into(), "broken".into());
        assert_eq!(table.len(), 3);
        assert_eq!(table.file_count(), 3);
        assert_eq!(table.columns, cols(&["objective_value", "solver_name", "time"]));
        assert!(table.has_column("objective_value"))
    }
}
