//! Typed facet fields from encoded string columns.
//!
//! Benchmark result rows encode their parameters in free text, for instance
//! `objective_name = "SLOPE[fit_intercept=True,q=0.2,reg=0.1]"` and
//! `data_name = "Simulated[n_features=200,n_samples=500]"`. The extractor
//! pulls `key=value` tokens out of these and produces [`Point`]s, the rows
//! the figures are built from.

use regex::Regex;

use crate::common::{plot::*, res::*, *};
use crate::consts::data;

pub mod rules;

use self::rules::Rules;

/// Regex capturing the value of a `key=value` token.
///
/// The key must start the string or follow `[`, `,` or a space, so that
/// `reg` does not match `max_reg=...`. The value stops at `,`, `]` or a space.
pub fn key_value_re(key: &str) -> Res<Regex> {
    Regex::new(&format!(
        r"(?:^|[\[,\s]){}=([^,\]\s]*)",
        ::regex::escape(key)
    ))
    .chain_err(|| format!("while building pattern for key `{}`", key))
}

/// Extracts a numeric parameter, the column facets.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    /// Key of the parameter.
    pub key: String,
    /// Column the parameter is looked up in.
    pub column: String,
    /// Value regex.
    re: Regex,
}
impl ParamSpec {
    /// Constructor.
    pub fn new<S1: Into<String>, S2: Into<String>>(key: S1, column: S2) -> Res<Self> {
        let (key, column) = (key.into(), column.into());
        let re = key_value_re(&key)?;
        Ok(ParamSpec { key, column, re })
    }

    /// Parameter value of some text.
    ///
    /// `None` if the key does not appear, error if its value is not a number.
    pub fn of_str(&self, text: &str) -> Res<Option<f64>> {
        if let Some(caps) = self.re.captures(text) {
            let val = &caps[1];
            f64::from_str(val).map(Some).map_err(|_| {
                ErrorKind::BadNumber(self.column.clone(), self.key.clone(), val.into()).into()
            })
        } else {
            Ok(None)
        }
    }

    /// Parameter value of a row.
    pub fn extract(&self, row: &Row) -> Res<Option<f64>> {
        if let Some(text) = row.field(&self.column) {
            self.of_str(text)
        } else {
            Ok(None)
        }
    }
}

/// How the label token is found.
#[derive(Debug, Clone)]
enum LabelPattern {
    /// `key=value` tokens, `k1=v1, k2=v2` when there are several.
    Keys(Vec<(String, Regex)>),
    /// First group of a regex.
    Regex(Regex),
}

/// Extracts the categorical label of a row, the row facets.
#[derive(Debug, Clone)]
pub struct RowSpec {
    /// Column the label is extracted from.
    pub column: String,
    /// Label pattern.
    pattern: LabelPattern,
    /// Renamings applied to the extracted token.
    pub rename: Rules,
}
impl RowSpec {
    /// Label made of the values of some keys.
    pub fn keys<S: AsRef<str>>(keys: &[S]) -> Res<Self> {
        if keys.is_empty() {
            bail!("row labels need at least one key")
        }
        let mut res = Vec::with_capacity(keys.len());
        for key in keys {
            let key = key.as_ref();
            res.push((key.to_string(), key_value_re(key)?))
        }
        Ok(RowSpec {
            column: data::data_name.into(),
            pattern: LabelPattern::Keys(res),
            rename: Rules::new(),
        })
    }

    /// Label given by the first group of a regex.
    pub fn pattern(re: &str) -> Res<Self> {
        let regex = Regex::new(re).chain_err(|| "while building row label pattern")?;
        if regex.captures_len() < 2 {
            bail!("row label pattern `{}` has no capture group", re)
        }
        Ok(RowSpec {
            column: data::data_name.into(),
            pattern: LabelPattern::Regex(regex),
            rename: Rules::new(),
        })
    }

    /// Sets the renaming rules.
    pub fn with_rename(mut self, rename: Rules) -> Self {
        self.rename = rename;
        self
    }

    /// Sets the column.
    pub fn with_column<S: Into<String>>(mut self, column: S) -> Self {
        self.column = column.into();
        self
    }

    /// Token extracted from some text, before renaming.
    pub fn token(&self, text: &str) -> Option<String> {
        match &self.pattern {
            LabelPattern::Keys(keys) if keys.len() == 1 => keys[0]
                .1
                .captures(text)
                .map(|caps| caps[1].to_string()),
            LabelPattern::Keys(keys) => {
                let mut res = String::new();
                for (key, re) in keys {
                    let caps = re.captures(text)?;
                    if !res.is_empty() {
                        res.push_str(", ")
                    }
                    res.push_str(key);
                    res.push('=');
                    res.push_str(&caps[1])
                }
                Some(res)
            }
            LabelPattern::Regex(re) => re
                .captures(text)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string()),
        }
    }

    /// Label of some text, `unknown` if the pattern does not match.
    pub fn label(&self, text: Option<&str>) -> String {
        text.and_then(|text| self.token(text))
            .map(|token| self.rename.rename(&token).to_string())
            .unwrap_or_else(|| data::unknown.into())
    }
}

/// A typed benchmark observation.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    /// Row label (dataset or scenario).
    pub row: String,
    /// Column value (numeric parameter).
    pub col: f64,
    /// Series identity.
    pub solver: String,
    /// Replicate index.
    pub rep: Option<i64>,
    /// Elapsed time in seconds.
    pub time: f64,
    /// Primal objective.
    pub objective: Option<f64>,
    /// Duality gap.
    pub gap: Option<f64>,
    /// Maximum relative duality gap.
    pub max_rel_gap: Option<f64>,
}
impl Point {
    /// The facet this point belongs to.
    pub fn key(&self) -> FacetKey {
        FacetKey::new(self.col, self.row.clone())
    }
}

/// Result of an extraction.
#[derive(Debug, Default)]
pub struct Extracted {
    /// Points.
    pub points: Vec<Point>,
    /// Rows rejected by the filter.
    pub filtered: usize,
    /// Rows without the numeric parameter.
    pub no_param: usize,
    /// Rows without a solver name or a time.
    pub incomplete: usize,
    /// Rows with the `unknown` row label.
    pub unknown: usize,
}
impl Extracted {
    /// Total number of rows excluded from the figure.
    pub fn excluded(&self) -> usize {
        self.filtered + self.no_param + self.incomplete
    }
}

/// Field extractor.
#[derive(Debug, Clone)]
pub struct Extractor {
    /// Numeric parameter.
    pub param: ParamSpec,
    /// Row label.
    pub rows: RowSpec,
    /// Only rows whose `data_name` matches this are kept.
    pub filter: Option<Regex>,
}
impl Extractor {
    /// Constructor.
    pub fn new(param: ParamSpec, rows: RowSpec) -> Self {
        Extractor {
            param,
            rows,
            filter: None,
        }
    }

    /// Sets the filter.
    pub fn with_filter(mut self, filter: Option<Regex>) -> Self {
        self.filter = filter;
        self
    }

    /// Extracts a single row, `None` if the row is excluded.
    fn point_of(&self, row: &Row, res: &mut Extracted) -> Res<Option<Point>> {
        let data_name = row.field(data::data_name);

        if let Some(filter) = &self.filter {
            if !data_name.map(|name| filter.is_match(name)).unwrap_or(false) {
                res.filtered += 1;
                return Ok(None);
            }
        }

        let col = if let Some(col) = self.param.extract(row)? {
            col
        } else {
            res.no_param += 1;
            return Ok(None);
        };

        let (solver, time) = match (row.field(data::solver_name), row.num(data::time)?) {
            (Some(solver), Some(time)) => (solver.to_string(), time),
            _ => {
                res.incomplete += 1;
                return Ok(None);
            }
        };

        let label = self.rows.label(row.field(&self.rows.column));
        if label == data::unknown {
            res.unknown += 1
        }

        let rep = row.num(data::idx_rep)?.map(|rep| rep as i64);

        Ok(Some(Point {
            row: label,
            col,
            solver,
            rep,
            time,
            objective: row.num(data::objective_value)?,
            gap: row.num(data::duality_gap)?,
            max_rel_gap: row.num(data::max_rel_duality_gap)?,
        }))
    }

    /// Extracts the points of a table.
    pub fn run(&self, table: &ResultTable) -> Res<Extracted> {
        let mut res = Extracted::default();
        res.points.reserve(table.len());
        for (index, row) in table.rows.iter().enumerate() {
            let point = self.point_of(row, &mut res).chain_err(|| {
                format!(
                    "while extracting fields of row {} (`{}` / `{}`)",
                    index,
                    row.field(data::objective_name).unwrap_or("?"),
                    row.field(data::data_name).unwrap_or("?"),
                )
            })?;
            if let Some(point) = point {
                res.points.push(point)
            }
        }
        Ok(res)
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
    fn param_extraction() {
        let reg = ParamSpec::new("reg", data::objective_name).unwrap();
        assert_eq!(
            reg.of_str("SLOPE[fit_intercept=True,q=0.2,reg=0.1]").unwrap(),
            Some(0.1)
        );
        assert_eq!(reg.of_str("SLOPE[reg=0.02,q=0.2]").unwrap(), Some(0.02));
        assert_eq!(reg.of_str("reg=5e-3").unwrap(), Some(0.005));
        // Key must be a whole token.
        assert_eq!(reg.of_str("SLOPE[max_reg=0.5]").unwrap(), None);
        assert_eq!(reg.of_str("SLOPE[q=0.2]").unwrap(), None);

        let path = ParamSpec::new("path_length", data::objective_name).unwrap();
        assert_eq!(path.of_str("SLOPE[path_length=100]").unwrap(), Some(100.))
    }

    #[test]
    fn bad_number_is_an_error() {
        let reg = ParamSpec::new("reg", data::objective_name).unwrap();
        match reg.of_str("SLOPE[reg=0.1.2]") {
            Err(Error(ErrorKind::BadNumber(column, key, text), _)) => {
                assert_eq!(column, "objective_name");
                assert_eq!(key, "reg");
                assert_eq!(text, "0.1.2")
            }
            res => panic!("unexpected result {:?}", res),
        }
        assert!(reg.of_str("SLOPE[reg=high]").is_err())
    }

    #[test]
    fn row_labels() {
        let spec = RowSpec::keys(&["dataset"]).unwrap();
        assert_eq!(spec.label(Some("[dataset=brca1]")), "brca1");
        assert_eq!(
            spec.label(Some("libsvm[dataset=rcv1.binary,standardize=False]")),
            "rcv1.binary"
        );
        assert_eq!(spec.label(Some("Simulated[n_samples=10]")), "unknown");
        assert_eq!(spec.label(None), "unknown");

        let spec = RowSpec::keys(&["n_features", "n_samples"]).unwrap();
        assert_eq!(
            spec.label(Some("Simulated[n_features=200,n_samples=500,rho=0.3]")),
            "n_features=200, n_samples=500"
        );
        assert_eq!(spec.label(Some("Simulated[n_features=200]")), "unknown")
    }

    #[test]
    fn row_label_renaming() {
        let rename = Rules::new()
            .contains("n_features=200000", "High Dim, Sparse")
            .contains("n_features=20000", "High Dim")
            .contains("n_samples=", "Low Dim");
        let spec = RowSpec::keys(&["n_features", "n_samples"])
            .unwrap()
            .with_rename(rename);
        assert_eq!(
            spec.label(Some("Simulated[n_features=200000,n_samples=200]")),
            "High Dim, Sparse"
        );
        assert_eq!(
            spec.label(Some("Simulated[n_features=20000,n_samples=200]")),
            "High Dim"
        );
        assert_eq!(
            spec.label(Some("Simulated[n_features=200,n_samples=20000]")),
            "Low Dim"
        );
        // Sentinel is not renamed.
        assert_eq!(spec.label(Some("Simulated[]")), "unknown")
    }

    #[test]
    fn row_label_regex() {
        let spec = RowSpec::pattern(r"dataset=([^,\]]+)").unwrap();
        assert_eq!(spec.label(Some("[dataset=Scheetz2006]")), "Scheetz2006");
        assert!(RowSpec::pattern(r"dataset=[^,\]]+").is_err())
    }

    #[test]
    fn extraction_is_deterministic() {
        let spec = RowSpec::keys(&["dataset"]).unwrap();
        let text = "breheny[dataset=Koussounadis2014]";
        assert_eq!(spec.label(Some(text)), spec.label(Some(text)));
        assert_eq!(spec.label(Some("nothing")), spec.label(Some("nothing")))
    }

    #[test]
    fn run_excludes_incomplete_rows() {
        let mut table = ResultTable::new();
        let rows = vec![
            row(&[
                ("objective_name", "SLOPE[reg=0.1]"),
                ("data_name", "breheny[dataset=brca1]"),
                ("solver_name", "ADMM"),
                ("idx_rep", "0"),
                ("time", "1.0"),
                ("objective_value", "10.0"),
                ("objective_duality_gap", "0.5"),
            ]),
            // No reg.
            row(&[
                ("objective_name", "SLOPE[q=0.1]"),
                ("data_name", "breheny[dataset=brca1]"),
                ("solver_name", "ADMM"),
                ("time", "1.0"),
            ]),
            // No time.
            row(&[
                ("objective_name", "SLOPE[reg=0.1]"),
                ("data_name", "breheny[dataset=brca1]"),
                ("solver_name", "ADMM"),
            ]),
            // Filtered out.
            row(&[
                ("objective_name", "SLOPE[reg=0.1]"),
                ("data_name", "Simulated[n_features=10]"),
                ("solver_name", "ADMM"),
                ("time", "1.0"),
            ]),
            // Unknown dataset, kept.
            row(&[
                ("objective_name", "SLOPE[reg=0.5]"),
                ("data_name", "breheny[]"),
                ("solver_name", "PGD"),
                ("time", "2.0"),
            ]),
        ];
        table.push_source("a.csv".into(), Set::new(), rows);

        let extractor = Extractor::new(
            ParamSpec::new("reg", data::objective_name).unwrap(),
            RowSpec::keys(&["dataset"]).unwrap(),
        )
        .with_filter(Some(Regex::new("breheny|libsvm").unwrap()));

        let res = extractor.run(&table).unwrap();
        assert_eq!(res.points.len(), 2);
        assert_eq!(res.filtered, 1);
        assert_eq!(res.no_param, 1);
        assert_eq!(res.incomplete, 1);
        assert_eq!(res.unknown, 1);
        assert_eq!(res.excluded(), 3);

        let first = &res.points[0];
        assert_eq!(first.key(), FacetKey::new(0.1, "brca1"));
        assert_eq!(first.rep, Some(0));
        assert_eq!(first.gap, Some(0.5));
        assert_eq!(first.max_rel_gap, None);
        assert_eq!(res.points[1].row, "unknown")
    }

    #[test]
    fn run_surfaces_bad_numbers() {
        let mut table = ResultTable::new();
        table.push_source(
            "a.csv".into(),
            Set::new(),
            vec![row(&[
                ("objective_name", "SLOPE[reg=lots]"),
                ("data_name", "[dataset=brca1]"),
                ("solver_name", "ADMM"),
                ("time", "1.0"),
            ])],
        );
        let extractor = Extractor::new(
            ParamSpec::new("reg", data::objective_name).unwrap(),
            RowSpec::keys(&["dataset"]).unwrap(),
        );
        assert!(extractor.run(&table).is_err())
    }
}
