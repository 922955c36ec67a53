// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! egui painter for a [`WaferScene`]

use eframe::egui;
use egui::epaint::{PathShape, PathStroke};
use lyon_tessellation::{
    math::point, path::Path, BuffersBuilder, FillOptions, FillTessellator, FillVertex,
    VertexBuffers,
};

use crate::wafer::scene::WaferScene;
use crate::wafer::{Die, Point};

const BACKGROUND: egui::Color32 = egui::Color32::from_rgb(243, 244, 246);
const WAFER_FACE: egui::Color32 = egui::Color32::WHITE;
const WAFER_STROKE: egui::Color32 = egui::Color32::from_rgb(156, 163, 175);
const CUTOUT_FILL: egui::Color32 = egui::Color32::from_rgb(229, 231, 235);
const GRID_STROKE: egui::Color32 = egui::Color32::from_rgb(209, 213, 219);
const AXIS_TEXT: egui::Color32 = egui::Color32::from_rgb(51, 51, 51);
const DIE_SELECTED: egui::Color32 = egui::Color32::from_rgb(37, 99, 235);
const DIE_UNSELECTED: egui::Color32 = egui::Color32::from_rgb(96, 165, 250);
const DIE_STROKE: egui::Color32 = egui::Color32::from_rgb(31, 41, 55);

/// Cells smaller than this get no coordinate text.
const MIN_LABELED_CELL_PX: f64 = 18.0;

/// What happened on the map this frame. The map never changes the selection itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct WaferMapResponse {
    pub clicked: Option<Die>,
    pub hovered: Option<Die>,
}

fn to_screen(origin: egui::Pos2, p: Point) -> egui::Pos2 {
    egui::pos2(origin.x + p.x as f32, origin.y + p.y as f32)
}

fn to_canvas(origin: egui::Pos2, p: egui::Pos2) -> Point {
    Point::new(f64::from(p.x - origin.x), f64::from(p.y - origin.y))
}

/// Triangulate a simple (possibly concave) polygon into a mesh.
fn fill_polygon(points: &[egui::Pos2], color: egui::Color32) -> Option<egui::Mesh> {
    if points.len() < 3 {
        return None;
    }

    let mut builder = Path::builder();
    builder.begin(point(points[0].x, points[0].y));
    for p in &points[1..] {
        builder.line_to(point(p.x, p.y));
    }
    builder.end(true);
    let path = builder.build();

    let mut buffers: VertexBuffers<egui::Pos2, u32> = VertexBuffers::new();
    let mut tessellator = FillTessellator::new();
    if let Err(e) = tessellator.tessellate_path(
        &path,
        &FillOptions::default(),
        &mut BuffersBuilder::new(&mut buffers, |v: FillVertex| {
            let p = v.position();
            egui::pos2(p.x, p.y)
        }),
    ) {
        log::warn!("Failed to tessellate wafer outline: {e:?}");
        return None;
    }

    let mut mesh = egui::Mesh::default();
    for pos in buffers.vertices {
        mesh.colored_vertex(pos, color);
    }
    for tri in buffers.indices.chunks_exact(3) {
        mesh.add_triangle(tri[0], tri[1], tri[2]);
    }
    Some(mesh)
}

fn paint_outline(painter: &egui::Painter, origin: egui::Pos2, scene: &WaferScene) {
    let boundary: Vec<egui::Pos2> = scene
        .outline
        .boundary
        .iter()
        .map(|p| to_screen(origin, *p))
        .collect();

    if let Some(mesh) = fill_polygon(&boundary, WAFER_FACE) {
        painter.add(egui::Shape::mesh(mesh));
    }

    for cutout in &scene.outline.cutouts {
        let points: Vec<egui::Pos2> = cutout.iter().map(|p| to_screen(origin, *p)).collect();
        if let Some(mesh) = fill_polygon(&points, CUTOUT_FILL) {
            painter.add(egui::Shape::mesh(mesh));
        }
    }

    // Stroking the cut boundary leaves the rim undrawn across the flat/notch.
    painter.add(PathShape::closed_line(
        boundary,
        PathStroke::new(2.0, WAFER_STROKE),
    ));
}

fn paint_grid(painter: &egui::Painter, origin: egui::Pos2, scene: &WaferScene) {
    let stroke = egui::Stroke::new(1.0, GRID_STROKE);
    for line in &scene.grid_lines {
        painter.line_segment(
            [to_screen(origin, line.from), to_screen(origin, line.to)],
            stroke,
        );
    }
}

fn paint_axes(painter: &egui::Painter, origin: egui::Pos2, scene: &WaferScene) {
    let font = egui::FontId::proportional(14.0);
    for tick in &scene.column_ticks {
        painter.text(
            to_screen(origin, tick.position),
            egui::Align2::CENTER_BOTTOM,
            tick.value.to_string(),
            font.clone(),
            AXIS_TEXT,
        );
    }
    for tick in &scene.row_ticks {
        painter.text(
            to_screen(origin, tick.position),
            egui::Align2::RIGHT_CENTER,
            tick.value.to_string(),
            font.clone(),
            AXIS_TEXT,
        );
    }
}

fn paint_dies(painter: &egui::Painter, origin: egui::Pos2, scene: &WaferScene) {
    let unit = scene.layout.unit;
    let min_side = unit.width.min(unit.height);
    let rounding = (min_side * 0.12).max(2.0) as f32;
    let show_labels = min_side >= MIN_LABELED_CELL_PX;
    let font = egui::FontId::proportional((min_side * 0.3).clamp(9.0, 16.0) as f32);

    for scene_die in &scene.dies {
        let tile = scene_die.rect.shrink(1.0);
        let min = to_screen(origin, Point::new(tile.x, tile.y));
        let size = egui::vec2(tile.width.max(2.0) as f32, tile.height.max(2.0) as f32);
        let rect = egui::Rect::from_min_size(min, size);

        let fill = if scene_die.selected {
            DIE_SELECTED
        } else {
            DIE_UNSELECTED
        };
        painter.rect_filled(rect, rounding, fill);
        painter.rect_stroke(
            rect,
            rounding,
            egui::Stroke::new(0.8, DIE_STROKE),
            egui::StrokeKind::Middle,
        );

        if show_labels {
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                scene_die.die.key(),
                font.clone(),
                egui::Color32::WHITE,
            );
        }
    }
}

/// Paint `scene` at its natural size and report clicks and hover by die identity.
pub fn show(ui: &mut egui::Ui, scene: &WaferScene) -> WaferMapResponse {
    let (width, height) = scene.canvas_size();
    let (response, painter) = ui.allocate_painter(
        egui::vec2(width as f32, height as f32),
        egui::Sense::click(),
    );
    let origin = response.rect.min;

    painter.rect_filled(response.rect, 0.0, BACKGROUND);
    paint_outline(&painter, origin, scene);
    paint_grid(&painter, origin, scene);
    paint_axes(&painter, origin, scene);
    paint_dies(&painter, origin, scene);

    let hovered = response
        .hover_pos()
        .and_then(|pos| scene.die_at(to_canvas(origin, pos)));

    let clicked = if response.clicked() {
        response
            .interact_pointer_pos()
            .and_then(|pos| scene.die_at(to_canvas(origin, pos)))
    } else {
        None
    };

    if let Some(die) = hovered {
        response
            .on_hover_cursor(egui::CursorIcon::PointingHand)
            .on_hover_text(die.to_string());
    }

    WaferMapResponse { clicked, hovered }
}
