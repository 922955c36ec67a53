// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Projection of grid coordinates into canvas pixels
//!
//! The canvas is `diameter + margins` wide and tall, with the wafer circle centered in the
//! inner square. Coordinates are relative to the canvas top-left corner.

use super::geometry::{solve_unit_cell, GridBounds, UnitCell};
use super::{Die, DieSet, Point};

/// Clearance between the fit circle and the drawn wafer stroke.
pub const STROKE_CLEARANCE_PX: f64 = 4.0;

/// Gap between the circle and the axis labels.
const COLUMN_LABEL_GAP_PX: f64 = 16.0;
const ROW_LABEL_GAP_PX: f64 = 18.0;

/// Closest two axis labels may get; narrower cells only label every n-th one.
const MIN_TICK_SPACING_PX: f64 = 12.0;
/// Cells narrower than this get no per-cell grid lines along that axis.
const MIN_GRID_SPACING_PX: f64 = 2.0;

/// Smallest `n` such that `n` cells span at least `min_spacing_px`.
fn tick_stride(cell_px: f64, min_spacing_px: f64) -> usize {
    if cell_px >= min_spacing_px {
        1
    } else if cell_px > 0.0 {
        (min_spacing_px / cell_px).ceil() as usize
    } else {
        usize::MAX
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            left: 80.0,
            top: 80.0,
            right: 24.0,
            bottom: 48.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelRect {
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x, self.y),
            Point::new(self.x + self.width, self.y),
            Point::new(self.x + self.width, self.y + self.height),
            Point::new(self.x, self.y + self.height),
        ]
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Half-open containment, so neighbouring cells never both claim a shared edge.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.x + self.width && p.y >= self.y && p.y < self.y + self.height
    }

    pub fn shrink(&self, amount: f64) -> Self {
        let width = (self.width - 2.0 * amount).max(0.0);
        let height = (self.height - 2.0 * amount).max(0.0);
        let c = self.center();
        Self {
            x: c.x - width / 2.0,
            y: c.y - height / 2.0,
            width,
            height,
        }
    }
}

/// Axis label anchored at `position`, showing an original coordinate value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisTick {
    pub position: Point,
    pub value: i32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLine {
    pub from: Point,
    pub to: Point,
}

impl GridLine {
    /// The part of this segment inside the circle, if any.
    pub fn clip_to_circle(&self, center: Point, radius: f64) -> Option<GridLine> {
        let dx = self.to.x - self.from.x;
        let dy = self.to.y - self.from.y;
        let fx = self.from.x - center.x;
        let fy = self.from.y - center.y;

        let a = dx * dx + dy * dy;
        if a == 0.0 {
            return None;
        }
        let b = 2.0 * (fx * dx + fy * dy);
        let c = fx * fx + fy * fy - radius * radius;
        let disc = b * b - 4.0 * a * c;
        if disc <= 0.0 {
            return None;
        }

        let sqrt_disc = disc.sqrt();
        let t0 = ((-b - sqrt_disc) / (2.0 * a)).max(0.0);
        let t1 = ((-b + sqrt_disc) / (2.0 * a)).min(1.0);
        if t0 >= t1 {
            return None;
        }

        let at = |t: f64| Point::new(self.from.x + t * dx, self.from.y + t * dy);
        Some(GridLine {
            from: at(t0),
            to: at(t1),
        })
    }
}

/// Everything needed to place dies on the canvas. Recomputed from scratch whenever the
/// die set or the diameter changes.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutGeometry {
    pub bounds: GridBounds,
    pub cols: u64,
    pub rows: u64,
    pub unit: UnitCell,
    pub center: Point,
    pub radius: f64,
    pub fit_radius: f64,
    pub margins: Margins,
}

impl LayoutGeometry {
    pub fn compute(dies: &DieSet, diameter: f64) -> Self {
        Self::with_margins(dies, diameter, Margins::default())
    }

    pub fn with_margins(dies: &DieSet, diameter: f64, margins: Margins) -> Self {
        let bounds = GridBounds::from_die_set(dies);
        let radius = diameter / 2.0;
        let fit_radius = (radius - STROKE_CLEARANCE_PX).max(1.0);
        let unit = solve_unit_cell(dies, fit_radius);
        let center = Point::new(margins.left + radius, margins.top + radius);

        log::debug!(
            "Wafer layout: {}x{} grid, cell {:.2}x{:.2}px, fit radius {:.1}px",
            bounds.cols(),
            bounds.rows(),
            unit.width,
            unit.height,
            fit_radius
        );

        Self {
            bounds,
            cols: bounds.cols(),
            rows: bounds.rows(),
            unit,
            center,
            radius,
            fit_radius,
            margins,
        }
    }

    pub fn canvas_size(&self) -> (f64, f64) {
        let diameter = self.radius * 2.0;
        (
            diameter + self.margins.left + self.margins.right,
            diameter + self.margins.top + self.margins.bottom,
        )
    }

    /// Top-left corner of the grid.
    pub fn grid_origin(&self) -> Point {
        Point::new(
            self.center.x - self.cols as f64 / 2.0 * self.unit.width,
            self.center.y - self.rows as f64 / 2.0 * self.unit.height,
        )
    }

    pub fn grid_rect(&self) -> PixelRect {
        let origin = self.grid_origin();
        PixelRect {
            x: origin.x,
            y: origin.y,
            width: self.cols as f64 * self.unit.width,
            height: self.rows as f64 * self.unit.height,
        }
    }

    /// Full cell rectangle for `die`.
    pub fn die_rect(&self, die: &Die) -> PixelRect {
        let origin = self.grid_origin();
        let (gx, gy) = self.bounds.grid_position(die);
        PixelRect {
            x: origin.x + gx as f64 * self.unit.width,
            y: origin.y + gy as f64 * self.unit.height,
            width: self.unit.width,
            height: self.unit.height,
        }
    }

    /// Column labels above the circle, valued `min_x + i`. Narrow cells are labelled
    /// every n-th column only, so the count stays bounded by the canvas width.
    pub fn column_ticks(&self) -> Vec<AxisTick> {
        let origin = self.grid_origin();
        let y = self.center.y - self.radius - COLUMN_LABEL_GAP_PX;
        let stride = tick_stride(self.unit.width, MIN_TICK_SPACING_PX);
        (0..self.cols)
            .step_by(stride)
            .map(|i| AxisTick {
                position: Point::new(origin.x + (i as f64 + 0.5) * self.unit.width, y),
                value: (i64::from(self.bounds.min_x) + i as i64) as i32,
            })
            .collect()
    }

    /// Row labels left of the circle, valued `max_y - j` from the top, thinned like
    /// [`Self::column_ticks`].
    pub fn row_ticks(&self) -> Vec<AxisTick> {
        let origin = self.grid_origin();
        let x = self.center.x - self.radius - ROW_LABEL_GAP_PX;
        let stride = tick_stride(self.unit.height, MIN_TICK_SPACING_PX);
        (0..self.rows)
            .step_by(stride)
            .map(|j| AxisTick {
                position: Point::new(x, origin.y + (j as f64 + 0.5) * self.unit.height),
                value: (i64::from(self.bounds.max_y) - j as i64) as i32,
            })
            .collect()
    }

    /// Vertical then horizontal lines on every cell boundary. An axis whose cells are
    /// narrower than a couple of pixels gets no lines at all.
    pub fn grid_lines(&self) -> Vec<GridLine> {
        let grid = self.grid_rect();
        let mut lines = Vec::new();
        if self.unit.width >= MIN_GRID_SPACING_PX {
            lines.extend((0..=self.cols).map(|i| {
                let x = grid.x + i as f64 * self.unit.width;
                GridLine {
                    from: Point::new(x, grid.y),
                    to: Point::new(x, grid.y + grid.height),
                }
            }));
        }
        if self.unit.height >= MIN_GRID_SPACING_PX {
            lines.extend((0..=self.rows).map(|j| {
                let y = grid.y + j as f64 * self.unit.height;
                GridLine {
                    from: Point::new(grid.x, y),
                    to: Point::new(grid.x + grid.width, y),
                }
            }));
        }
        lines
    }
}
