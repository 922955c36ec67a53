// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Backend wire types and HTTP client

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::wafer::WaferMeta;

pub type BackendError = Box<dyn std::error::Error + Send + Sync>;

/// A test-program modification attached to a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mod {
    pub name: String,
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub devices: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceListResponse {
    #[serde(default)]
    pub devices: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceModsRequest {
    pub devices: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceModsResponse {
    #[serde(default)]
    pub mods: Vec<Mod>,
    #[serde(default)]
    pub wafers: HashMap<String, Vec<String>>,
    #[serde(rename = "waferMeta", default)]
    pub wafer_meta: Option<HashMap<String, WaferMeta>>,
}

impl DeviceModsResponse {
    pub fn wafer_coords(&self, device: &str) -> &[String] {
        self.wafers.get(device).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn meta_for(&self, device: &str) -> Option<&WaferMeta> {
        self.wafer_meta.as_ref()?.get(device)
    }
}

/// The e-test backend as seen by the session controller.
pub trait EtestBackend: Send + Sync {
    fn list_devices(&self) -> Result<Vec<String>, BackendError>;
    fn device_mods(&self, device: &str) -> Result<DeviceModsResponse, BackendError>;
    fn health(&self) -> Result<bool, BackendError>;
}

pub struct HttpBackend {
    base: String,
    client: reqwest::blocking::Client,
}

impl HttpBackend {
    pub fn new(base: &str, timeout: Duration) -> Result<Self, BackendError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            base: base.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }
}

impl EtestBackend for HttpBackend {
    fn list_devices(&self) -> Result<Vec<String>, BackendError> {
        let url = self.url("/api/etest/json");
        log::info!("[LOAD] Fetching device list from {url}");
        let res = self.client.get(&url).send()?;
        if !res.status().is_success() {
            return Err(format!("Failed to load devices: {}", res.status()).into());
        }
        let body: DeviceListResponse = res.json()?;
        Ok(body.devices)
    }

    fn device_mods(&self, device: &str) -> Result<DeviceModsResponse, BackendError> {
        let url = self.url("/api/etest/device-mods");
        log::info!("[LOAD] Fetching mods and wafer map for {device}");
        let request = DeviceModsRequest {
            devices: vec![device.to_string()],
        };
        let res = self.client.post(&url).json(&request).send()?;
        if !res.status().is_success() {
            return Err(format!("Failed to load device data: {}", res.status()).into());
        }
        Ok(res.json()?)
    }

    fn health(&self) -> Result<bool, BackendError> {
        let res = self.client.get(self.url("/api/health")).send()?;
        Ok(res.status().is_success())
    }
}
