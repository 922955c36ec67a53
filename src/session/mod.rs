// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Device/mod session state
//!
//! Owns the device list, the active device's wafer data and the die selection. Fetches
//! run elsewhere; their results come back through [`DeviceSession::apply_device_response`],
//! which drops anything issued for a device that is no longer active.

pub mod api;
pub mod worker;

use std::fmt;

use serde::Serialize;

use crate::filter::filter_items;
use crate::selection::SelectionModel;
use crate::wafer::center::{center_die, CenterDie};
use crate::wafer::parser::parse_dies;
use crate::wafer::{Die, DieSet, WaferMeta};
use api::{DeviceModsResponse, Mod};

/// Ticket for one in-flight device fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRequest {
    pub device: String,
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// The response belongs to a superseded request and was discarded.
    Stale,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedWafer {
    pub device: String,
    pub dies: Option<DieSet>,
    pub meta: Option<WaferMeta>,
    /// Coordinate strings that failed to parse.
    pub rejected: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionPayload {
    pub device: String,
    #[serde(rename = "skywaterInitial")]
    pub skywater_initial: String,
    pub dies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    NoDevice,
    MissingInitials,
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitError::NoDevice => write!(f, "Please select a device before submitting."),
            SubmitError::MissingInitials => {
                write!(f, "Please enter Skywater initial before submitting.")
            }
        }
    }
}

impl std::error::Error for SubmitError {}

#[derive(Debug, Default)]
pub struct DeviceSession {
    devices: Vec<String>,
    devices_loading: bool,
    selected_device: Option<String>,
    generation: u64,
    pending: Option<DeviceRequest>,
    wafer: Option<LoadedWafer>,
    mods: Vec<Mod>,
    selection: SelectionModel,
    error: Option<String>,
}

impl DeviceSession {
    pub fn new() -> Self {
        Self::default()
    }

    // Device list

    pub fn begin_devices_load(&mut self) {
        self.devices_loading = true;
        self.error = None;
    }

    /// Store a fetched device list. On failure the previous list is kept.
    pub fn apply_devices(&mut self, result: Result<Vec<String>, String>) {
        self.devices_loading = false;
        match result {
            Ok(devices) => {
                log::info!("[INFO] Loaded {} devices", devices.len());
                self.devices = devices;
            }
            Err(error) => {
                log::error!("Device list fetch failed: {error}");
                self.error = Some(error);
            }
        }
    }

    pub fn devices(&self) -> &[String] {
        &self.devices
    }

    pub fn devices_loading(&self) -> bool {
        self.devices_loading
    }

    pub fn filtered_devices(&self, query: &str) -> Vec<&str> {
        filter_items(&self.devices, query)
    }

    // Active device

    /// Make `device` active and return the ticket for fetching its data. Wafer data and
    /// selection are cleared together, even when reloading the same device.
    pub fn select_device(&mut self, device: &str) -> DeviceRequest {
        self.reset_device_state();
        self.selected_device = Some(device.to_string());
        let request = DeviceRequest {
            device: device.to_string(),
            generation: self.generation,
        };
        self.pending = Some(request.clone());
        request
    }

    /// Deselect the active device. Responses still in flight become stale.
    pub fn clear_device(&mut self) {
        self.reset_device_state();
        self.selected_device = None;
    }

    fn reset_device_state(&mut self) {
        self.generation += 1;
        self.pending = None;
        self.wafer = None;
        self.mods.clear();
        self.selection.clear();
        self.error = None;
    }

    pub fn is_current(&self, request: &DeviceRequest) -> bool {
        request.generation == self.generation
            && self.selected_device.as_deref() == Some(request.device.as_str())
    }

    pub fn apply_device_response(
        &mut self,
        request: &DeviceRequest,
        result: Result<DeviceModsResponse, String>,
    ) -> ApplyOutcome {
        if !self.is_current(request) {
            log::debug!(
                "Discarding stale response for {} (generation {}, current {})",
                request.device,
                request.generation,
                self.generation
            );
            return ApplyOutcome::Stale;
        }
        self.pending = None;

        let response = match result {
            Ok(response) => response,
            Err(error) => {
                log::error!("Loading {} failed: {error}", request.device);
                self.error = Some(error);
                return ApplyOutcome::Failed;
            }
        };

        let parsed = parse_dies(response.wafer_coords(&request.device));
        let rejected = parsed.rejected.clone();
        let dies = parsed.into_die_set();
        let meta = response.meta_for(&request.device).cloned();

        log::info!(
            "[INFO] {}: {} mods, {} dies ({} rejected)",
            request.device,
            response.mods.len(),
            dies.as_ref().map_or(0, DieSet::len),
            rejected.len()
        );

        self.mods = response.mods;
        self.selection.clear();
        self.wafer = Some(LoadedWafer {
            device: request.device.clone(),
            dies,
            meta,
            rejected,
        });
        ApplyOutcome::Applied
    }

    pub fn selected_device(&self) -> Option<&str> {
        self.selected_device.as_deref()
    }

    pub fn is_loading_device(&self) -> bool {
        self.pending.is_some()
    }

    pub fn wafer(&self) -> Option<&LoadedWafer> {
        self.wafer.as_ref()
    }

    pub fn die_set(&self) -> Option<&DieSet> {
        self.wafer.as_ref()?.dies.as_ref()
    }

    pub fn wafer_meta(&self) -> Option<&WaferMeta> {
        self.wafer.as_ref()?.meta.as_ref()
    }

    pub fn center_die(&self) -> Option<CenterDie> {
        let dies = self.die_set()?;
        let meta = self.wafer_meta();
        Some(center_die(
            dies,
            meta.and_then(|m| m.step_x_um),
            meta.and_then(|m| m.step_y_um),
        ))
    }

    pub fn mods(&self) -> &[Mod] {
        &self.mods
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_error(&mut self, error: String) {
        self.error = Some(error);
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    // Selection

    pub fn selection(&self) -> &SelectionModel {
        &self.selection
    }

    /// Toggle a die of the loaded set. Dies outside the set are ignored.
    pub fn toggle_die(&mut self, die: &Die) -> bool {
        let loaded = self.die_set().is_some_and(|dies| dies.contains(die));
        if !loaded {
            log::warn!("Ignoring toggle for die {} outside the loaded wafer", die.key());
            return false;
        }
        self.selection.toggle(die)
    }

    pub fn select_all(&mut self) {
        if let Some(dies) = self.wafer.as_ref().and_then(|w| w.dies.as_ref()) {
            self.selection.select_all(dies);
        }
    }

    pub fn unselect_all(&mut self) {
        self.selection.clear();
    }

    pub fn submission(&self, initials: &str) -> Result<SubmissionPayload, SubmitError> {
        let device = self
            .wafer
            .as_ref()
            .map(|w| w.device.clone())
            .ok_or(SubmitError::NoDevice)?;
        let initials = initials.trim();
        if initials.is_empty() {
            return Err(SubmitError::MissingInitials);
        }
        Ok(SubmissionPayload {
            device,
            skywater_initial: initials.to_string(),
            dies: self.selection.to_vec(),
        })
    }
}
