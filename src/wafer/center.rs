// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

use serde::Serialize;

use super::geometry::GridBounds;
use super::DieSet;

/// Center die of the grid and the sub-die offset (µm) when the grid has an even
/// number of dies along an axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CenterDie {
    pub x: i32,
    pub y: i32,
    pub offset_x_um: f64,
    pub offset_y_um: f64,
}

fn axis_center(min: i32, max: i32, step_um: Option<f64>) -> (i32, f64) {
    let sum = i64::from(min) + i64::from(max);
    let center = sum.div_euclid(2) as i32;
    if sum % 2 == 0 {
        (center, 0.0)
    } else {
        (center, -step_um.unwrap_or(0.0) / 2.0)
    }
}

pub fn center_die(dies: &DieSet, step_x_um: Option<f64>, step_y_um: Option<f64>) -> CenterDie {
    let bounds = GridBounds::from_die_set(dies);
    let (x, offset_x_um) = axis_center(bounds.min_x, bounds.max_x, step_x_um);
    let (y, offset_y_um) = axis_center(bounds.min_y, bounds.max_y, step_y_um);
    CenterDie {
        x,
        y,
        offset_x_um,
        offset_y_um,
    }
}
