// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Integration tests for the unit-cell solver and die projection
//!
//! Tests cover:
//! - Degenerate grids (single die, single row, single column)
//! - Containment of every die rectangle in the fit circle
//! - Exact fit of the outermost die corner
//! - Disjoint die rectangles

use etest_wafer_viewer::wafer::geometry::solve_unit_cell;
use etest_wafer_viewer::wafer::layout::{LayoutGeometry, STROKE_CLEARANCE_PX};
use etest_wafer_viewer::wafer::{Die, DieSet};
use proptest::prelude::*;

fn die_set(coords: &[(i32, i32)]) -> DieSet {
    DieSet::new(coords.iter().map(|&(x, y)| Die::new(x, y)).collect()).unwrap()
}

/// Largest distance from the circle center to any die corner.
fn max_corner_distance(layout: &LayoutGeometry, dies: &DieSet) -> f64 {
    dies.iter()
        .flat_map(|d| layout.die_rect(d).corners())
        .map(|c| c.distance_to(layout.center))
        .fold(0.0, f64::max)
}

#[test]
fn test_single_die_uses_full_radius() {
    let dies = die_set(&[(5, -3)]);
    let unit = solve_unit_cell(&dies, 396.0);
    assert_eq!(unit.width, 396.0);
    assert_eq!(unit.height, 396.0);

    let layout = LayoutGeometry::compute(&dies, 800.0);
    assert!(max_corner_distance(&layout, &dies) <= layout.fit_radius);
}

#[test]
fn test_single_row_has_square_cells() {
    let dies = die_set(&[(0, 0), (1, 0), (2, 0), (3, 0), (4, 0)]);
    let unit = solve_unit_cell(&dies, 300.0);
    assert!((unit.width - unit.height).abs() < 1e-9);

    let layout = LayoutGeometry::compute(&dies, 608.0);
    let max = max_corner_distance(&layout, &dies);
    assert!(max <= layout.fit_radius + 1e-9);
    assert!((max - layout.fit_radius).abs() < 1e-6);
}

#[test]
fn test_single_column_has_square_cells() {
    let dies = die_set(&[(7, -2), (7, -1), (7, 0)]);
    let unit = solve_unit_cell(&dies, 250.0);
    assert!((unit.width - unit.height).abs() < 1e-9);
}

#[test]
fn test_two_by_two_fits_in_396px_circle() {
    let dies = die_set(&[(0, 0), (1, 0), (0, 1), (1, 1)]);
    let layout = LayoutGeometry::compute(&dies, 800.0);

    assert_eq!(layout.fit_radius, 400.0 - STROKE_CLEARANCE_PX);
    assert_eq!(layout.fit_radius, 396.0);

    let expected_unit = 396.0 / 2.0_f64.sqrt();
    assert!((layout.unit.width - expected_unit).abs() < 1e-9);
    assert!((layout.unit.height - expected_unit).abs() < 1e-9);

    for die in &dies {
        for corner in layout.die_rect(die).corners() {
            assert!(corner.distance_to(layout.center) <= 396.0 + 1e-9);
        }
    }
}

#[test]
fn test_corner_die_does_not_poke_out() {
    // A wide, short grid where the naive per-axis fit would push corners outside.
    let mut coords = Vec::new();
    for x in 0..12 {
        for y in 0..3 {
            coords.push((x, y));
        }
    }
    let dies = die_set(&coords);
    let layout = LayoutGeometry::compute(&dies, 500.0);

    let max = max_corner_distance(&layout, &dies);
    assert!(max <= layout.fit_radius + 1e-9);
    assert!((max - layout.fit_radius).abs() < 1e-6);
    // Cells stay anisotropic to follow the grid's aspect ratio.
    assert!(layout.unit.height > layout.unit.width);
}

#[test]
fn test_sparse_grid_with_negative_coordinates() {
    let dies = die_set(&[(-4, -4), (3, 2), (0, 0), (-1, 5)]);
    let layout = LayoutGeometry::compute(&dies, 720.0);
    assert_eq!(layout.cols, 8);
    assert_eq!(layout.rows, 10);
    assert!(max_corner_distance(&layout, &dies) <= layout.fit_radius + 1e-9);
}

#[test]
fn test_die_rects_are_disjoint() {
    let dies = die_set(&[(0, 0), (1, 0), (0, 1), (1, 1), (2, 1)]);
    let layout = LayoutGeometry::compute(&dies, 400.0);
    let rects: Vec<_> = dies.iter().map(|d| layout.die_rect(d)).collect();

    for (i, a) in rects.iter().enumerate() {
        for b in rects.iter().skip(i + 1) {
            let overlap_x = a.x < b.x + b.width - 1e-9 && b.x < a.x + a.width - 1e-9;
            let overlap_y = a.y < b.y + b.height - 1e-9 && b.y < a.y + a.height - 1e-9;
            assert!(!(overlap_x && overlap_y), "{a:?} overlaps {b:?}");
        }
    }
}

fn arb_coords() -> impl Strategy<Value = Vec<(i32, i32)>> {
    prop::collection::vec((-25i32..25, -25i32..25), 1..80)
}

proptest! {
    #[test]
    fn every_die_lies_within_fit_circle(coords in arb_coords(), diameter in 200.0f64..1600.0) {
        let dies = die_set(&coords);
        let layout = LayoutGeometry::compute(&dies, diameter);
        let max = max_corner_distance(&layout, &dies);
        prop_assert!(max <= layout.fit_radius * (1.0 + 1e-12) + 1e-9,
            "corner at {} exceeds fit radius {}", max, layout.fit_radius);
    }

    #[test]
    fn multi_die_grids_touch_the_fit_circle(coords in arb_coords(), diameter in 200.0f64..1600.0) {
        let dies = die_set(&coords);
        prop_assume!(dies.len() > 1);
        let layout = LayoutGeometry::compute(&dies, diameter);
        prop_assume!(layout.cols > 1 || layout.rows > 1);
        let max = max_corner_distance(&layout, &dies);
        prop_assert!((max - layout.fit_radius).abs() < 1e-6);
    }

    #[test]
    fn dense_rectangles_keep_cells_positive(cols in 1i32..40, rows in 1i32..40) {
        let mut coords = Vec::new();
        for x in 0..cols {
            for y in 0..rows {
                coords.push((x - cols / 2, y - rows / 2));
            }
        }
        let dies = die_set(&coords);
        let unit = solve_unit_cell(&dies, 396.0);
        prop_assert!(unit.width > 0.0 && unit.height > 0.0);
    }
}
