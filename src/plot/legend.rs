//! Legend synthesis.

use regex::Regex;

use crate::common::{plot::*, *};
use crate::extract::rules::Rules;

use super::compare::Cell;
use super::grid::{FacetPlan, Grid};

/// What unmatched series identities become.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fallback {
    /// The identity itself.
    Raw,
    /// `base[acceleration,prox]`, without the `prox_` prefix.
    Compact,
}
impl Fallback {
    /// Describes the legal values, should match the body of `Self::of_str`.
    pub fn values() -> &'static str {
        "raw|compact"
    }
    /// Fallback of a string.
    pub fn of_str(s: &str) -> Option<Self> {
        match s {
            "raw" => Some(Fallback::Raw),
            "compact" => Some(Fallback::Compact),
            _ => None,
        }
    }
}

lazy_static! {
    static ref acceleration_re: Regex = Regex::new(r"acceleration=([^,\]\s]+)").unwrap();
    static ref prox_re: Regex = Regex::new(r"prox=([^,\]\s]+)").unwrap();
}

/// Compact label of a series identity.
///
/// `PGD[acceleration=anderson,prox=prox_fast]` gives `PGD[anderson,fast]`.
/// Identities without parameters are unchanged.
pub fn compact(solver: &str) -> String {
    let base = match solver.find('[') {
        Some(index) => &solver[..index],
        None => return solver.to_string(),
    };
    let accel = acceleration_re.captures(solver).map(|caps| caps[1].to_string());
    let prox = prox_re
        .captures(solver)
        .map(|caps| caps[1].trim_start_matches("prox_").to_string());
    match (accel, prox) {
        (Some(accel), Some(prox)) => format!("{}[{},{}]", base, accel, prox),
        (Some(param), None) | (None, Some(param)) => format!("{}[{}]", base, param),
        (None, None) => solver.to_string(),
    }
}

/// Turns series identities into legend labels.
#[derive(Debug, Clone)]
pub struct Labeler {
    rules: Rules,
    fallback: Fallback,
}
impl Labeler {
    /// Constructor.
    pub fn new(rules: Rules, fallback: Fallback) -> Self {
        Labeler { rules, fallback }
    }
    /// Rules.
    pub fn rules(&self) -> &Rules {
        &self.rules
    }
    /// Fallback.
    pub fn fallback(&self) -> Fallback {
        self.fallback
    }

    /// Label of a series identity.
    pub fn label(&self, solver: &str) -> String {
        if let Some(label) = self.rules.apply(solver) {
            label.to_string()
        } else {
            match self.fallback {
                Fallback::Raw => solver.to_string(),
                Fallback::Compact => compact(solver),
            }
        }
    }
}

/// A legend entry.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    /// Series identity.
    pub solver: String,
    /// Label.
    pub label: String,
    /// Encoding of the series.
    pub encoding: Encoding,
}

/// The legend of a figure.
#[derive(Debug, Clone, PartialEq)]
pub struct Legend {
    /// Entries, sorted by identity.
    pub entries: Vec<LegendEntry>,
    /// Number of columns.
    pub cols: usize,
}
impl Legend {
    /// Legend of the series drawn in some cells.
    pub fn new(cells: &Grid<Cell>, plan: &FacetPlan, labeler: &Labeler, max_cols: usize) -> Self {
        let solvers: Set<&str> = cells
            .iter()
            .flat_map(|(_, cell)| cell.series.iter().map(|series| series.solver.as_str()))
            .collect();
        let entries: Vec<_> = solvers
            .into_iter()
            .filter_map(|solver| {
                plan.encoding(solver).map(|encoding| LegendEntry {
                    solver: solver.to_string(),
                    label: labeler.label(solver),
                    encoding: encoding.clone(),
                })
            })
            .collect();
        let cols = ::std::cmp::max(1, ::std::cmp::min(max_cols, entries.len()));
        Legend { entries, cols }
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    /// True if there are no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    /// Number of lines the legend takes.
    pub fn lines(&self) -> usize {
        (self.entries.len() + self.cols - 1) / self.cols
    }
}
