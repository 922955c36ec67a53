// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Framework-free description of one wafer map frame
//!
//! A painter only has to walk a [`WaferScene`]; it never decides geometry or selection
//! state itself, and clicks are resolved back to a [`Die`] through [`WaferScene::die_at`].

use super::flat::resolve_flat_angle;
use super::layout::{AxisTick, GridLine, LayoutGeometry, PixelRect};
use super::outline::{wafer_outline, OutlineOptions, WaferOutline};
use super::{Die, DieSet, Point, WaferMeta};
use crate::selection::SelectionModel;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapOptions {
    pub diameter: f64,
    pub outline: OutlineOptions,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            diameter: 720.0,
            outline: OutlineOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneDie {
    pub die: Die,
    /// Full grid cell; painters inset it for the visible tile.
    pub rect: PixelRect,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WaferScene {
    pub layout: LayoutGeometry,
    pub outline: WaferOutline,
    pub cutout_angle_deg: Option<f64>,
    pub grid_lines: Vec<GridLine>,
    pub column_ticks: Vec<AxisTick>,
    pub row_ticks: Vec<AxisTick>,
    pub dies: Vec<SceneDie>,
}

impl WaferScene {
    pub fn canvas_size(&self) -> (f64, f64) {
        self.layout.canvas_size()
    }

    /// Die whose cell contains `point` (canvas coordinates).
    pub fn die_at(&self, point: Point) -> Option<Die> {
        self.dies
            .iter()
            .find(|d| d.rect.contains(point))
            .map(|d| d.die)
    }

    pub fn selected_count(&self) -> usize {
        self.dies.iter().filter(|d| d.selected).count()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WaferView {
    /// Nothing to draw: no device loaded or the device has no usable dies.
    NoData,
    Map(WaferScene),
}

impl WaferView {
    pub fn scene(&self) -> Option<&WaferScene> {
        match self {
            WaferView::NoData => None,
            WaferView::Map(scene) => Some(scene),
        }
    }
}

pub fn build_scene(
    dies: &DieSet,
    meta: Option<&WaferMeta>,
    selection: &SelectionModel,
    options: &MapOptions,
) -> WaferScene {
    let layout = LayoutGeometry::compute(dies, options.diameter);
    let cutout_angle_deg = resolve_flat_angle(meta);
    // Dies fill the fit circle, so the cutout has to stay outside it.
    let outline_options = options.outline.clear_of(layout.radius, layout.fit_radius);
    let outline = wafer_outline(
        layout.center,
        layout.radius,
        cutout_angle_deg,
        &outline_options,
    );

    let scene_dies = dies
        .iter()
        .map(|die| SceneDie {
            die: *die,
            rect: layout.die_rect(die),
            selected: selection.is_selected(die),
        })
        .collect();

    let grid_lines = layout
        .grid_lines()
        .iter()
        .filter_map(|line| line.clip_to_circle(layout.center, layout.radius))
        .collect();

    WaferScene {
        grid_lines,
        column_ticks: layout.column_ticks(),
        row_ticks: layout.row_ticks(),
        dies: scene_dies,
        outline,
        cutout_angle_deg,
        layout,
    }
}

pub fn build_view(
    dies: Option<&DieSet>,
    meta: Option<&WaferMeta>,
    selection: &SelectionModel,
    options: &MapOptions,
) -> WaferView {
    match dies {
        Some(dies) => WaferView::Map(build_scene(dies, meta, selection, options)),
        None => WaferView::NoData,
    }
}
