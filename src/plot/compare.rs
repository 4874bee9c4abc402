//! Comparison figure: one cell per facet, one series per solver.

use crate::common::{plot::*, *};
use crate::consts::style;
use crate::extract::Point;

use super::grid::{FacetPlan, Grid};
use super::legend::Legend;

/// Points of one solver in one cell, sorted by repetition then time.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    /// Series identity.
    pub solver: String,
    /// Encoding.
    pub encoding: Encoding,
    /// `(time, metric)` pairs.
    pub points: Vec<(f64, f64)>,
    /// Indices of the points starting a new repetition, the line is broken
    /// before them.
    pub breaks: Vec<usize>,
}

/// A facet of the figure.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// Facet.
    pub key: FacetKey,
    /// Column title, top row only.
    pub title: Option<String>,
    /// Row label, last column only.
    pub side: Option<String>,
    /// Series, sorted by identity.
    pub series: Vec<Series>,
    /// X range, autoscale if none.
    pub x_range: Option<(f64, f64)>,
    /// Y range, autoscale if none.
    pub y_range: Option<(f64, f64)>,
}
impl Cell {
    /// True if the cell has nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.series.iter().all(|series| series.points.is_empty())
    }
}

/// A complete figure, ready to be written.
#[derive(Debug, Clone)]
pub struct Figure {
    /// Layout.
    pub plan: FacetPlan,
    /// Cells.
    pub cells: Grid<Cell>,
    /// Legend.
    pub legend: Legend,
    /// Outer x label.
    pub x_label: String,
    /// Outer y label.
    pub y_label: String,
    /// Points that cannot be drawn on a log axis.
    pub dropped: usize,
    /// Axis overrides for facets that do not exist.
    pub unused_limits: Vec<FacetKey>,
}

/// Smallest and largest `y` of some series, padded for a log axis.
fn y_bounds<'a, I>(series: I) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = &'a Series>,
{
    let mut bounds: Option<(f64, f64)> = None;
    for series in series {
        for &(_, y) in &series.points {
            bounds = Some(match bounds {
                None => (y, y),
                Some((lo, hi)) => (lo.min(y), hi.max(y)),
            })
        }
    }
    bounds.map(|(lo, hi)| (lo / 1.5, hi * 1.5))
}

/// Builds the figure for some points.
pub fn build(conf: &FigureConf, points: &[Point]) -> Figure {
    let plan = FacetPlan::new(points, conf.order, &conf.style);

    let mut groups: Map<FacetKey, Map<&str, Vec<&Point>>> = Map::new();
    for point in points {
        groups
            .entry(point.key())
            .or_insert_with(Map::new)
            .entry(point.solver.as_str())
            .or_insert_with(Vec::new)
            .push(point)
    }

    let mut dropped = 0;
    let keys = plan.keys();
    let series = keys.map(|_, key| {
        let by_solver = if let Some(by_solver) = groups.get(key) {
            by_solver
        } else {
            return vec![];
        };
        let mut res = Vec::with_capacity(by_solver.len());
        for (solver, solver_points) in by_solver {
            let encoding = if let Some(encoding) = plan.encoding(solver) {
                encoding.clone()
            } else {
                continue;
            };
            let mut xys = Vec::with_capacity(solver_points.len());
            for point in solver_points {
                match conf.metric.value(point) {
                    Some(y) if y.is_finite() && y > 0. => xys.push((point.rep, point.time, y)),
                    _ => dropped += 1,
                }
            }
            if xys.is_empty() {
                continue;
            }
            xys.sort_by(|(r1, t1, _), (r2, t2, _)| r1.cmp(r2).then(t1.total_cmp(t2)));
            let breaks = (1..xys.len())
                .filter(|&index| xys[index].0 != xys[index - 1].0)
                .collect();
            res.push(Series {
                solver: solver.to_string(),
                encoding,
                points: xys.into_iter().map(|(_, time, y)| (time, y)).collect(),
                breaks,
            })
        }
        res
    });

    let shared_y = if conf.share_y {
        y_bounds(series.iter().flat_map(|(_, series)| series.iter()))
    } else {
        None
    };

    let last_col = plan.cols.len().saturating_sub(1);
    let cells = keys.map(|(row, col), key| {
        let (x_range, y_range) = if let Some(limits) = conf.limits.get(key) {
            (Some(limits.x), Some(limits.y))
        } else {
            (None, shared_y)
        };
        Cell {
            key: key.clone(),
            title: if row == 0 {
                Some(format!("{}: {}", conf.column_title, key.col))
            } else {
                None
            },
            side: if col == last_col {
                Some(key.row.clone())
            } else {
                None
            },
            series: series[(row, col)].clone(),
            x_range,
            y_range,
        }
    });

    let unused_limits = conf
        .limits
        .keys()
        .filter(|key| plan.coords_of(key).is_none())
        .cloned()
        .collect();

    let legend = Legend::new(&cells, &plan, &conf.legend, conf.legend_cols);

    Figure {
        plan,
        cells,
        legend,
        x_label: style::x_label.into(),
        y_label: conf.metric.label().into(),
        dropped,
        unused_limits,
    }
}
