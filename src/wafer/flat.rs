// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Wafer flat/notch orientation
//!
//! Two upstream conventions meet here and both tables must stay exactly as they are:
//!
//! - location codes map straight into screen angles: `R` 0, `B` 90, `L` 180, `T` 270
//! - numeric `flatAngle_deg` is measured with 0 at the top and 90 at the right, so it is
//!   rebased with `(deg + 270) mod 360`
//!
//! Screen angles have 0 pointing right and grow clockwise because y points down.

use super::WaferMeta;

/// Screen-space angle for a compass location code.
pub fn location_angle(code: &str) -> Option<f64> {
    match code.trim().to_ascii_uppercase().as_str() {
        "R" => Some(0.0),
        "B" => Some(90.0),
        "L" => Some(180.0),
        "T" => Some(270.0),
        _ => None,
    }
}

/// Rebase a top-origin angle (0 top, 90 right) into screen convention.
pub fn rebase_source_angle(deg: f64) -> Option<f64> {
    if !deg.is_finite() {
        return None;
    }
    Some((deg + 270.0).rem_euclid(360.0))
}

/// Resolve the cutout angle for a wafer, or `None` for a plain circle.
///
/// A non-empty location code wins over the numeric angle, even when the code is not
/// recognized.
pub fn resolve_flat_angle(meta: Option<&WaferMeta>) -> Option<f64> {
    let meta = meta?;

    if let Some(code) = meta
        .flat_location
        .as_deref()
        .filter(|c| !c.trim().is_empty())
    {
        let angle = location_angle(code);
        if angle.is_none() {
            log::warn!("Unrecognized flat location {code:?}, drawing plain wafer outline");
        }
        return angle;
    }

    let deg = meta.flat_angle_deg?;
    let angle = rebase_source_angle(deg);
    if angle.is_none() {
        log::warn!("Non-finite flat angle {deg}, drawing plain wafer outline");
    }
    angle
}
