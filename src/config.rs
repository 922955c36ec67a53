// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Startup configuration read from the environment

use std::time::Duration;

use crate::wafer::outline::CutoutStyle;

pub const DEFAULT_API_BASE: &str = "http://localhost:8080";
pub const DEFAULT_WAFER_DIAMETER: f64 = 820.0;
const MIN_WAFER_DIAMETER: f64 = 200.0;
const MAX_WAFER_DIAMETER: f64 = 4000.0;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api_base: String,
    pub wafer_diameter_px: f64,
    pub cutout_style: CutoutStyle,
    pub request_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            wafer_diameter_px: DEFAULT_WAFER_DIAMETER,
            cutout_style: CutoutStyle::Flat,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup. Bad values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(base) = lookup("ETEST_API_BASE").filter(|b| !b.trim().is_empty()) {
            config.api_base = base.trim().trim_end_matches('/').to_string();
        }

        if let Some(raw) = lookup("ETEST_WAFER_DIAMETER") {
            match raw.trim().parse::<f64>() {
                Ok(d) if d.is_finite() => {
                    config.wafer_diameter_px = d.clamp(MIN_WAFER_DIAMETER, MAX_WAFER_DIAMETER);
                }
                _ => log::warn!("Invalid ETEST_WAFER_DIAMETER {raw:?}, using default"),
            }
        }

        if let Some(raw) = lookup("ETEST_CUTOUT_STYLE") {
            match CutoutStyle::parse(&raw) {
                Some(style) => config.cutout_style = style,
                None => log::warn!("Unknown ETEST_CUTOUT_STYLE {raw:?}, using flat"),
            }
        }

        if let Some(raw) = lookup("ETEST_TIMEOUT_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.request_timeout = Duration::from_secs(secs),
                _ => log::warn!("Invalid ETEST_TIMEOUT_SECS {raw:?}, using default"),
            }
        }

        config
    }
}
