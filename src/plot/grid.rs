//! Facet grid planning.

use std::ops::Index;

use crate::common::{plot::*, *};
use crate::extract::Point;

/// A row-major 2D grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    rows: usize,
    cols: usize,
    cells: Vec<T>,
}
impl<T> Grid<T> {
    /// Builds a grid from a function of the coordinates `(row, col)`.
    pub fn from_fn<F>(rows: usize, cols: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> T,
    {
        let mut cells = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                cells.push(f(row, col))
            }
        }
        Grid { rows, cols, cells }
    }

    /// Number of rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }
    /// Number of columns.
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Cell at some coordinates, if legal.
    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        if row < self.rows && col < self.cols {
            self.cells.get(row * self.cols + col)
        } else {
            None
        }
    }

    /// Iterates over the cells in row-major order, with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = ((usize, usize), &T)> {
        let cols = self.cols;
        self.cells
            .iter()
            .enumerate()
            .map(move |(index, cell)| ((index / cols, index % cols), cell))
    }

    /// Applies a function to all cells.
    pub fn map<U, F>(&self, mut f: F) -> Grid<U>
    where
        F: FnMut((usize, usize), &T) -> U,
    {
        let cells = self.iter().map(|(coords, cell)| f(coords, cell)).collect();
        Grid {
            rows: self.rows,
            cols: self.cols,
            cells,
        }
    }
}
impl<T> Index<(usize, usize)> for Grid<T> {
    type Output = T;
    fn index(&self, (row, col): (usize, usize)) -> &T {
        assert!(
            row < self.rows && col < self.cols,
            "cell ({}, {}) is outside a {}x{} grid",
            row,
            col,
            self.rows,
            self.cols
        );
        &self.cells[row * self.cols + col]
    }
}

/// Layout of the figure: rows, columns and series encodings.
#[derive(Debug, Clone)]
pub struct FacetPlan {
    /// Row labels, sorted.
    pub rows: Vec<String>,
    /// Column values, in figure order.
    pub cols: Vec<ColVal>,
    /// Series identity to encoding, for all identities.
    pub encodings: Map<String, Encoding>,
}
impl FacetPlan {
    /// Plans the facets of some points.
    pub fn new(points: &[Point], order: Order, style: &Style) -> Self {
        let rows: Set<&str> = points.iter().map(|p| p.row.as_str()).collect();
        let cols: Set<ColVal> = points.iter().map(|p| ColVal(p.col)).collect();
        let solvers: Set<&str> = points.iter().map(|p| p.solver.as_str()).collect();

        let rows = rows.into_iter().map(|r| r.to_string()).collect();
        let mut cols: Vec<ColVal> = cols.into_iter().collect();
        if order == Order::Desc {
            cols.reverse()
        }
        let encodings = solvers
            .into_iter()
            .enumerate()
            .map(|(index, solver)| (solver.to_string(), style.encoding(index)))
            .collect();

        FacetPlan {
            rows,
            cols,
            encodings,
        }
    }

    /// Grid of the facet keys.
    pub fn keys(&self) -> Grid<FacetKey> {
        Grid::from_fn(self.rows.len(), self.cols.len(), |row, col| FacetKey {
            col: self.cols[col],
            row: self.rows[row].clone(),
        })
    }

    /// Coordinates of a facet.
    pub fn coords_of(&self, key: &FacetKey) -> Option<(usize, usize)> {
        let row = self.rows.iter().position(|r| r == &key.row)?;
        let col = self.cols.iter().position(|c| c == &key.col)?;
        Some((row, col))
    }

    /// Encoding of a series.
    pub fn encoding(&self, solver: &str) -> Option<&Encoding> {
        self.encodings.get(solver)
    }
}

/// Test helpers, shared with the other plot modules.
#[cfg(test)]
pub mod test {
    use super::*;

    /// A point, only the facet and solver matter.
    pub fn point(col: f64, row: &str, solver: &str, time: f64, gap: f64) -> Point {
        Point {
            row: row.into(),
            col,
            solver: solver.into(),
            rep: None,
            time,
            objective: Some(1.),
            gap: Some(gap),
            max_rel_gap: None,
        }
    }

    #[test]
    fn grid_shapes() {
        for &(rows, cols) in &[(1, 1), (1, 4), (3, 1), (2, 3)] {
            let grid = Grid::from_fn(rows, cols, |r, c| (r, c));
            assert_eq!(grid.rows(), rows);
            assert_eq!(grid.cols(), cols);
            for r in 0..rows {
                for c in 0..cols {
                    assert_eq!(grid[(r, c)], (r, c));
                    assert_eq!(grid.get(r, c), Some(&(r, c)))
                }
            }
            assert_eq!(grid.get(rows, 0), None);
            assert_eq!(grid.get(0, cols), None);
            assert_eq!(grid.iter().count(), rows * cols);
            assert!(grid.iter().all(|(coords, cell)| coords == *cell))
        }
    }

    #[test]
    #[should_panic]
    fn grid_out_of_bounds() {
        let grid = Grid::from_fn(2, 2, |r, c| r + c);
        let _ = grid[(0, 2)];
    }

    #[test]
    fn plan_orders() {
        let points = vec![
            point(0.1, "b", "ADMM", 1., 1.),
            point(0.5, "a", "ADMM", 1., 1.),
            point(0.02, "b", "PGD", 1., 1.),
            point(0.1, "a", "PGD", 1., 1.),
        ];
        let style = Style::default();
        let plan = FacetPlan::new(&points, Order::Desc, &style);
        assert_eq!(plan.rows, vec!["a", "b"]);
        assert_eq!(plan.cols, vec![ColVal(0.5), ColVal(0.1), ColVal(0.02)]);
        let plan = FacetPlan::new(&points, Order::Asc, &style);
        assert_eq!(plan.cols, vec![ColVal(0.02), ColVal(0.1), ColVal(0.5)])
    }

    #[test]
    fn every_point_has_one_facet() {
        let points = vec![
            point(0.1, "b", "ADMM", 1., 1.),
            point(0.5, "a", "ADMM", 1., 1.),
            point(0.02, "unknown", "PGD", 1., 1.),
            point(0.1, "a", "PGD", 1., 1.),
        ];
        let plan = FacetPlan::new(&points, Order::Desc, &Style::default());
        let keys = plan.keys();
        for point in &points {
            let key = point.key();
            let matching = keys.iter().filter(|(_, k)| **k == key).count();
            assert_eq!(matching, 1);
            let (row, col) = plan.coords_of(&key).unwrap();
            assert_eq!(keys[(row, col)], key)
        }
    }

    #[test]
    fn encodings_ignore_row_order() {
        let mut points = vec![
            point(0.1, "a", "PGD[acceleration=bb]", 1., 1.),
            point(0.1, "a", "ADMM", 1., 1.),
            point(0.1, "b", "Hybrid", 1., 1.),
            point(0.5, "a", "FISTA", 1., 1.),
        ];
        let style = Style::default();
        let plan_1 = FacetPlan::new(&points, Order::Asc, &style);
        points.reverse();
        points.swap(0, 2);
        let plan_2 = FacetPlan::new(&points, Order::Asc, &style);
        assert_eq!(plan_1.encodings, plan_2.encodings);
        assert_eq!(plan_1.encoding("ADMM"), Some(&style.encoding(0)));
        assert_eq!(plan_1.encoding("PGD[acceleration=bb]"), Some(&style.encoding(3)))
    }

    #[test]
    fn encodings_cycle() {
        let points: Vec<_> = (0..12)
            .map(|i| point(0.1, "a", &format!("solver{:0>2}", i), 1., 1.))
            .collect();
        let style = Style::default();
        let plan = FacetPlan::new(&points, Order::Asc, &style);
        assert_eq!(plan.encodings.len(), 12);
        assert_eq!(
            plan.encoding("solver10").map(|e| &e.color),
            plan.encoding("solver00").map(|e| &e.color)
        );
        assert_ne!(
            plan.encoding("solver10").map(|e| e.marker),
            plan.encoding("solver00").map(|e| e.marker)
        )
    }
}
