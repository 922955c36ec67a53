// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

use std::collections::HashMap;
use std::time::Duration;

use etest_wafer_viewer::config::{AppConfig, DEFAULT_API_BASE, DEFAULT_WAFER_DIAMETER};
use etest_wafer_viewer::wafer::outline::CutoutStyle;

fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
    let env: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    AppConfig::from_lookup(|key| env.get(key).cloned())
}

#[test]
fn test_defaults() {
    let config = config_from(&[]);
    assert_eq!(config, AppConfig::default());
    assert_eq!(config.api_base, DEFAULT_API_BASE);
    assert_eq!(config.wafer_diameter_px, DEFAULT_WAFER_DIAMETER);
    assert_eq!(config.cutout_style, CutoutStyle::Flat);
    assert_eq!(config.request_timeout, Duration::from_secs(30));
}

#[test]
fn test_overrides() {
    let config = config_from(&[
        ("ETEST_API_BASE", "http://etest.local:9000/"),
        ("ETEST_WAFER_DIAMETER", "640"),
        ("ETEST_CUTOUT_STYLE", "notch"),
        ("ETEST_TIMEOUT_SECS", "5"),
    ]);
    assert_eq!(config.api_base, "http://etest.local:9000");
    assert_eq!(config.wafer_diameter_px, 640.0);
    assert_eq!(config.cutout_style, CutoutStyle::Notch);
    assert_eq!(config.request_timeout, Duration::from_secs(5));
}

#[test]
fn test_diameter_is_clamped() {
    assert_eq!(config_from(&[("ETEST_WAFER_DIAMETER", "10")]).wafer_diameter_px, 200.0);
    assert_eq!(
        config_from(&[("ETEST_WAFER_DIAMETER", "99999")]).wafer_diameter_px,
        4000.0
    );
}

#[test]
fn test_bad_values_fall_back_to_defaults() {
    let config = config_from(&[
        ("ETEST_API_BASE", "   "),
        ("ETEST_WAFER_DIAMETER", "big"),
        ("ETEST_CUTOUT_STYLE", "round"),
        ("ETEST_TIMEOUT_SECS", "0"),
    ]);
    assert_eq!(config, AppConfig::default());
}
