// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Wafer die-layout engine
//!
//! Everything under this module is free of any UI framework: dies go in, pixel-space
//! geometry comes out. The egui adapter in `crate::wafer_map` only paints what
//! [`scene::build_view`] produces.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fmt;

pub mod center;
pub mod flat;
pub mod geometry;
pub mod layout;
pub mod outline;
pub mod parser;
pub mod scene;

/// One die on the wafer grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Die {
    pub x: i32,
    pub y: i32,
}

impl Die {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Canonical identity key, `"x,y"`.
    pub fn key(&self) -> String {
        format!("{},{}", self.x, self.y)
    }
}

impl fmt::Display for Die {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// The dies of one device, in the order the backend reported them, with a hashed
/// index for membership checks.
///
/// Never empty: a device without dies is represented by the absence of a `DieSet`,
/// so nothing downstream has to guard against zero extents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DieSet {
    dies: Vec<Die>,
    members: HashSet<Die>,
}

impl DieSet {
    /// Build a set from parsed dies. Duplicate coordinates are dropped (first one wins).
    /// Returns `None` when no die remains.
    pub fn new(dies: Vec<Die>) -> Option<Self> {
        let mut members = HashSet::with_capacity(dies.len());
        let mut unique = Vec::with_capacity(dies.len());
        for die in dies {
            if members.insert(die) {
                unique.push(die);
            } else {
                log::warn!("Duplicate die coordinate {} dropped", die.key());
            }
        }

        if unique.is_empty() {
            None
        } else {
            Some(Self {
                dies: unique,
                members,
            })
        }
    }

    pub fn dies(&self) -> &[Die] {
        &self.dies
    }

    pub fn len(&self) -> usize {
        self.dies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dies.is_empty()
    }

    pub fn contains(&self, die: &Die) -> bool {
        self.members.contains(die)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Die> {
        self.dies.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = String> + '_ {
        self.dies.iter().map(Die::key)
    }
}

impl<'a> IntoIterator for &'a DieSet {
    type Item = &'a Die;
    type IntoIter = std::slice::Iter<'a, Die>;

    fn into_iter(self) -> Self::IntoIter {
        self.dies.iter()
    }
}

/// Pixel-space point, y grows downwards.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AlignDie {
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
}

/// Per-device wafer metadata as delivered by the backend.
///
/// Only the flat fields feed the layout; the rest is informational.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WaferMeta {
    #[serde(rename = "flatLocation", default)]
    pub flat_location: Option<String>,
    #[serde(
        rename = "flatAngle_deg",
        default,
        deserialize_with = "lenient_number"
    )]
    pub flat_angle_deg: Option<f64>,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(rename = "stepX_um", default, deserialize_with = "lenient_number")]
    pub step_x_um: Option<f64>,
    #[serde(rename = "stepY_um", default, deserialize_with = "lenient_number")]
    pub step_y_um: Option<f64>,
    #[serde(rename = "alignDie", default)]
    pub align_die: Option<AlignDie>,
    #[serde(rename = "alignModule", default)]
    pub align_module: Option<String>,
}

impl WaferMeta {
    pub fn with_flat_location(location: &str) -> Self {
        Self {
            flat_location: Some(location.to_string()),
            ..Default::default()
        }
    }

    pub fn with_flat_angle(angle_deg: f64) -> Self {
        Self {
            flat_angle_deg: Some(angle_deg),
            ..Default::default()
        }
    }
}

/// Accept a JSON number or a numeric string; anything else becomes `None`
/// instead of failing the whole response.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}
