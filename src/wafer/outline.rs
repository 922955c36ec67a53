// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Wafer outline with an optional flat or notch cut out of it
//!
//! The circle is sampled as a polygon, the wedge is built slightly larger than the
//! wafer, and boolean operations clip both pieces to the circle. Stroking the resulting
//! boundary ring leaves no outline across the cut.

use geo::{Area, BooleanOps, Coord, LineString, MultiPolygon, Polygon};

use super::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CutoutStyle {
    /// Straight chord, typical for 200 mm wafers.
    #[default]
    Flat,
    /// Small V-shaped notch, typical for 300 mm wafers.
    Notch,
}

impl CutoutStyle {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "flat" => Some(Self::Flat),
            "notch" => Some(Self::Notch),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlineOptions {
    pub style: CutoutStyle,
    /// Number of polygon segments approximating the circle.
    pub segments: usize,
    pub flat_half_span_deg: f64,
    pub notch_half_span_deg: f64,
    /// Notch depth as a fraction of the radius.
    pub notch_depth: f64,
}

impl Default for OutlineOptions {
    fn default() -> Self {
        Self {
            style: CutoutStyle::Flat,
            segments: 256,
            flat_half_span_deg: 12.0,
            notch_half_span_deg: 3.0,
            notch_depth: 0.04,
        }
    }
}

impl OutlineOptions {
    /// Shrink the cutout so it never reaches inside `keep_radius`. The flat chord then
    /// sits at or beyond `keep_radius` from the center and the notch apex no deeper.
    pub fn clear_of(&self, radius: f64, keep_radius: f64) -> Self {
        if radius <= 0.0 || keep_radius >= radius {
            return *self;
        }
        let keep = (keep_radius / radius).clamp(0.0, 1.0);
        Self {
            flat_half_span_deg: self.flat_half_span_deg.min(keep.acos().to_degrees()),
            notch_depth: self.notch_depth.min(1.0 - keep),
            ..*self
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct WaferOutline {
    /// Closed boundary ring of the wafer, without the repeated closing point.
    pub boundary: Vec<Point>,
    /// Regions removed by the cutout, each clipped to the circle.
    pub cutouts: Vec<Vec<Point>>,
}

impl WaferOutline {
    pub fn has_cutout(&self) -> bool {
        !self.cutouts.is_empty()
    }
}

fn polar(center: Point, radius: f64, angle_deg: f64) -> Coord<f64> {
    let t = angle_deg.to_radians();
    Coord {
        x: center.x + radius * t.cos(),
        y: center.y + radius * t.sin(),
    }
}

fn circle_polygon(center: Point, radius: f64, segments: usize) -> Polygon<f64> {
    let segments = segments.max(8);
    let mut coords: Vec<Coord<f64>> = (0..segments)
        .map(|i| polar(center, radius, 360.0 * i as f64 / segments as f64))
        .collect();
    coords.push(coords[0]);
    Polygon::new(LineString::from(coords), vec![])
}

fn wedge_polygon(center: Point, radius: f64, angle_deg: f64, options: &OutlineOptions) -> Polygon<f64> {
    let mut coords = match options.style {
        CutoutStyle::Flat => {
            // Region beyond the chord between angle -/+ half span, padded past the rim.
            let h = options.flat_half_span_deg;
            let start = polar(center, radius, angle_deg - h);
            let end = polar(center, radius, angle_deg + h);
            let along = Coord {
                x: (end.x - start.x) / 2.0,
                y: (end.y - start.y) / 2.0,
            };
            let out = polar(Point::default(), radius, angle_deg);
            vec![
                start - along,
                end + along,
                end + along + out,
                start - along + out,
            ]
        }
        CutoutStyle::Notch => {
            let h = options.notch_half_span_deg;
            let depth = radius * options.notch_depth;
            vec![
                polar(center, radius - depth, angle_deg),
                polar(center, radius + depth, angle_deg - h),
                polar(center, radius + depth, angle_deg + h),
            ]
        }
    };
    coords.push(coords[0]);
    Polygon::new(LineString::from(coords), vec![])
}

fn ring_points(ring: &LineString<f64>) -> Vec<Point> {
    let mut points: Vec<Point> = ring.coords().map(|c| Point::new(c.x, c.y)).collect();
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    points
}

/// Outline of a wafer of `radius` around `center`, cut at `cutout_angle_deg` if present.
pub fn wafer_outline(
    center: Point,
    radius: f64,
    cutout_angle_deg: Option<f64>,
    options: &OutlineOptions,
) -> WaferOutline {
    let circle = circle_polygon(center, radius, options.segments);

    let Some(angle) = cutout_angle_deg else {
        return WaferOutline {
            boundary: ring_points(circle.exterior()),
            cutouts: Vec::new(),
        };
    };

    let circle: MultiPolygon<f64> = circle.into();
    let wedge: MultiPolygon<f64> = wedge_polygon(center, radius, angle, options).into();

    let remaining = circle.difference(&wedge);
    let removed = circle.intersection(&wedge);

    let boundary = remaining
        .iter()
        .max_by(|a, b| a.unsigned_area().total_cmp(&b.unsigned_area()))
        .map(|p| ring_points(p.exterior()))
        .unwrap_or_default();

    let cutouts = removed
        .iter()
        .map(|p| ring_points(p.exterior()))
        .filter(|ring| ring.len() >= 3)
        .collect();

    WaferOutline { boundary, cutouts }
}
