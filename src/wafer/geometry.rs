// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Anisotropic unit-cell solver
//!
//! Finds the pixel width and height of one grid cell such that every die rectangle,
//! with the grid centered on the wafer, stays inside a circle of radius `R`.

use super::{Die, DieSet};

/// Bounding box of a die grid in original coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridBounds {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
}

impl GridBounds {
    pub fn from_die_set(dies: &DieSet) -> Self {
        let first = dies.dies()[0];
        let mut bounds = Self {
            min_x: first.x,
            max_x: first.x,
            min_y: first.y,
            max_y: first.y,
        };
        for die in dies {
            bounds.min_x = bounds.min_x.min(die.x);
            bounds.max_x = bounds.max_x.max(die.x);
            bounds.min_y = bounds.min_y.min(die.y);
            bounds.max_y = bounds.max_y.max(die.y);
        }
        bounds
    }

    /// Column count. A full `i32` span needs 33 bits, so this is 64-bit wide.
    pub fn cols(&self) -> u64 {
        (i64::from(self.max_x) - i64::from(self.min_x) + 1) as u64
    }

    pub fn rows(&self) -> u64 {
        (i64::from(self.max_y) - i64::from(self.min_y) + 1) as u64
    }

    /// Normalized grid position: column from the left, row from the top
    /// (larger `y` renders higher, so rows are inverted).
    pub fn grid_position(&self, die: &Die) -> (u64, u64) {
        let gx = i64::from(die.x) - i64::from(self.min_x);
        let gy = i64::from(self.max_y) - i64::from(die.y);
        (gx as u64, gy as u64)
    }

    /// Per-axis distance, in cell units, from the grid center to the farthest
    /// corner of `die`'s cell.
    pub fn corner_extent(&self, die: &Die) -> (f64, f64) {
        let (gx, gy) = self.grid_position(die);
        let a = (gx as f64 + 0.5 - self.cols() as f64 / 2.0).abs() + 0.5;
        let b = (gy as f64 + 0.5 - self.rows() as f64 / 2.0).abs() + 0.5;
        (a, b)
    }
}

/// Size of one grid cell in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitCell {
    pub width: f64,
    pub height: f64,
}

/// Solve the cell size for `dies` inside a circle of radius `fit_radius`.
///
/// A single die gets an `R x R` cell. A single row or column gets square cells sized so
/// the outermost corner lands on the circle. Otherwise both axes are normalized by their
/// largest extent and scaled jointly, so the die that is extreme on both axes at once
/// lands exactly on the circle and every other die falls inside it.
pub fn solve_unit_cell(dies: &DieSet, fit_radius: f64) -> UnitCell {
    let bounds = GridBounds::from_die_set(dies);
    let extents: Vec<(f64, f64)> = dies.iter().map(|d| bounds.corner_extent(d)).collect();

    let a_max = extents.iter().fold(0.0_f64, |m, &(a, _)| m.max(a));
    let b_max = extents.iter().fold(0.0_f64, |m, &(_, b)| m.max(b));

    let single_col = bounds.cols() == 1;
    let single_row = bounds.rows() == 1;

    if single_col && single_row {
        return UnitCell {
            width: fit_radius,
            height: fit_radius,
        };
    }

    if single_col || single_row {
        // The half-cell on the flat axis still counts towards the corner distance.
        let unit = fit_radius / a_max.hypot(b_max);
        return UnitCell {
            width: unit,
            height: unit,
        };
    }

    let r = extents
        .iter()
        .map(|&(a, b)| (a / a_max).hypot(b / b_max))
        .fold(1.0_f64, f64::max);

    UnitCell {
        width: fit_radius / (r * a_max),
        height: fit_radius / (r * b_max),
    }
}
