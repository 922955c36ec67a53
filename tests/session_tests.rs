// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use etest_wafer_viewer::session::api::{BackendError, DeviceModsResponse, EtestBackend, Mod};
use etest_wafer_viewer::session::worker::{FetchMessage, FetchWorker};
use etest_wafer_viewer::session::{ApplyOutcome, SubmitError};
use etest_wafer_viewer::{DeviceSession, Die, WaferMeta};

fn response_for(device: &str, coords: &[&str]) -> DeviceModsResponse {
    let mut wafers = HashMap::new();
    wafers.insert(
        device.to_string(),
        coords.iter().map(|c| c.to_string()).collect(),
    );
    let mut meta = HashMap::new();
    meta.insert(device.to_string(), WaferMeta::with_flat_location("B"));
    DeviceModsResponse {
        mods: vec![Mod {
            name: format!("{device}_MOD"),
            x: Some(1.5),
            y: Some(-2.0),
            devices: vec![device.to_string()],
        }],
        wafers,
        wafer_meta: Some(meta),
    }
}

fn square(device: &str) -> DeviceModsResponse {
    response_for(device, &["0,0", "1,0", "0,1", "1,1"])
}

#[test]
fn test_apply_response_loads_wafer() {
    let mut session = DeviceSession::new();
    let request = session.select_device("DEV_A");
    assert!(session.is_loading_device());

    let outcome = session.apply_device_response(&request, Ok(square("DEV_A")));
    assert_eq!(outcome, ApplyOutcome::Applied);
    assert!(!session.is_loading_device());
    assert_eq!(session.die_set().map(|d| d.len()), Some(4));
    assert_eq!(session.mods().len(), 1);
    assert_eq!(
        session.wafer_meta().and_then(|m| m.flat_location.clone()),
        Some("B".to_string())
    );
    assert!(session.selection().is_empty());
}

#[test]
fn test_stale_response_is_discarded() {
    let mut session = DeviceSession::new();
    let first = session.select_device("DEV_A");
    let second = session.select_device("DEV_B");

    // B answers first, then A's late answer must not replace it.
    assert_eq!(
        session.apply_device_response(&second, Ok(square("DEV_B"))),
        ApplyOutcome::Applied
    );
    assert_eq!(
        session.apply_device_response(&first, Ok(square("DEV_A"))),
        ApplyOutcome::Stale
    );
    assert_eq!(session.selected_device(), Some("DEV_B"));
    assert_eq!(session.wafer().map(|w| w.device.as_str()), Some("DEV_B"));
    assert_eq!(session.mods()[0].name, "DEV_B_MOD");
}

#[test]
fn test_response_after_clear_is_stale() {
    let mut session = DeviceSession::new();
    let request = session.select_device("DEV_A");
    session.clear_device();

    assert_eq!(
        session.apply_device_response(&request, Ok(square("DEV_A"))),
        ApplyOutcome::Stale
    );
    assert!(session.wafer().is_none());
    assert!(session.selected_device().is_none());
}

#[test]
fn test_reselecting_same_device_resets_selection() {
    let mut session = DeviceSession::new();
    let request = session.select_device("DEV_A");
    session.apply_device_response(&request, Ok(square("DEV_A")));
    session.select_all();
    assert_eq!(session.selection().len(), 4);

    let reload = session.select_device("DEV_A");
    assert!(session.selection().is_empty());
    assert!(session.wafer().is_none());
    assert!(session.mods().is_empty());

    // The earlier ticket for the same device is superseded too.
    assert_eq!(
        session.apply_device_response(&request, Ok(square("DEV_A"))),
        ApplyOutcome::Stale
    );
    assert_eq!(
        session.apply_device_response(&reload, Ok(square("DEV_A"))),
        ApplyOutcome::Applied
    );
}

#[test]
fn test_failed_response_reports_error() {
    let mut session = DeviceSession::new();
    let request = session.select_device("DEV_A");
    let outcome = session.apply_device_response(&request, Err("connection refused".to_string()));

    assert_eq!(outcome, ApplyOutcome::Failed);
    assert_eq!(session.error(), Some("connection refused"));
    assert!(session.die_set().is_none());
    assert!(!session.is_loading_device());

    session.dismiss_error();
    assert!(session.error().is_none());
}

#[test]
fn test_device_without_dies_has_no_die_set() {
    let mut session = DeviceSession::new();
    let request = session.select_device("EMPTY");
    let outcome = session.apply_device_response(&request, Ok(response_for("EMPTY", &["x", ""])));

    assert_eq!(outcome, ApplyOutcome::Applied);
    assert!(session.die_set().is_none());
    assert_eq!(session.wafer().map(|w| w.rejected.len()), Some(2));
    assert!(session.center_die().is_none());
}

#[test]
fn test_toggle_ignores_dies_outside_the_wafer() {
    let mut session = DeviceSession::new();
    assert!(!session.toggle_die(&Die::new(0, 0)));

    let request = session.select_device("DEV_A");
    session.apply_device_response(&request, Ok(square("DEV_A")));

    assert!(!session.toggle_die(&Die::new(7, 7)));
    assert!(session.selection().is_empty());

    assert!(session.toggle_die(&Die::new(1, 1)));
    assert!(session.selection().contains_key("1,1"));
    assert!(!session.toggle_die(&Die::new(1, 1)));
}

#[test]
fn test_select_all_and_unselect_all() {
    let mut session = DeviceSession::new();
    let request = session.select_device("DEV_A");
    session.apply_device_response(&request, Ok(square("DEV_A")));

    session.select_all();
    session.toggle_die(&Die::new(0, 0));
    assert_eq!(session.selection().to_vec(), vec!["0,1", "1,0", "1,1"]);

    session.unselect_all();
    assert!(session.selection().is_empty());
}

#[test]
fn test_submission_requires_device_and_initials() {
    let mut session = DeviceSession::new();
    assert_eq!(session.submission("AB"), Err(SubmitError::NoDevice));

    let request = session.select_device("DEV_A");
    session.apply_device_response(&request, Ok(square("DEV_A")));
    session.toggle_die(&Die::new(1, 0));

    let err = session.submission("   ").unwrap_err();
    assert_eq!(err, SubmitError::MissingInitials);
    assert_eq!(
        err.to_string(),
        "Please enter Skywater initial before submitting."
    );

    let payload = session.submission(" AB ").unwrap();
    assert_eq!(payload.device, "DEV_A");
    assert_eq!(payload.skywater_initial, "AB");
    assert_eq!(payload.dies, vec!["1,0".to_string()]);
}

#[test]
fn test_center_die_uses_step_metadata() {
    let mut response = response_for("DEV_A", &["0,0", "1,0", "2,0", "0,1", "1,1", "2,1"]);
    response.wafer_meta.as_mut().unwrap().insert(
        "DEV_A".to_string(),
        WaferMeta {
            step_x_um: Some(5000.0),
            step_y_um: Some(4000.0),
            ..Default::default()
        },
    );

    let mut session = DeviceSession::new();
    let request = session.select_device("DEV_A");
    session.apply_device_response(&request, Ok(response));

    let center = session.center_die().unwrap();
    assert_eq!((center.x, center.y), (1, 0));
    assert_eq!(center.offset_x_um, 0.0);
    assert_eq!(center.offset_y_um, -2000.0);
}

#[test]
fn test_failed_device_list_keeps_previous() {
    let mut session = DeviceSession::new();
    session.begin_devices_load();
    assert!(session.devices_loading());
    session.apply_devices(Ok(vec!["5CC9_8000".to_string(), "7AB1_1200".to_string()]));
    assert!(!session.devices_loading());

    session.begin_devices_load();
    session.apply_devices(Err("timeout".to_string()));
    assert_eq!(session.devices().len(), 2);
    assert_eq!(session.error(), Some("timeout"));
    assert_eq!(session.filtered_devices("7ab"), vec!["7AB1_1200"]);
}

struct FakeBackend {
    devices: Vec<String>,
    responses: HashMap<String, DeviceModsResponse>,
}

impl EtestBackend for FakeBackend {
    fn list_devices(&self) -> Result<Vec<String>, BackendError> {
        Ok(self.devices.clone())
    }

    fn device_mods(&self, device: &str) -> Result<DeviceModsResponse, BackendError> {
        self.responses
            .get(device)
            .cloned()
            .ok_or_else(|| format!("Unknown device {device}").into())
    }

    fn health(&self) -> Result<bool, BackendError> {
        Ok(true)
    }
}

fn wait_for_messages(worker: &FetchWorker, count: usize) -> Vec<FetchMessage> {
    let deadline = Instant::now() + Duration::from_secs(5);
    let mut messages = Vec::new();
    while messages.len() < count && Instant::now() < deadline {
        messages.extend(worker.poll());
        std::thread::sleep(Duration::from_millis(5));
    }
    messages
}

#[test]
fn test_worker_round_trip_through_session() {
    let mut responses = HashMap::new();
    responses.insert("DEV_A".to_string(), square("DEV_A"));
    let backend = Arc::new(FakeBackend {
        devices: vec!["DEV_A".to_string(), "DEV_B".to_string()],
        responses,
    });
    let worker = FetchWorker::new(backend);
    let mut session = DeviceSession::new();

    worker.fetch_devices();
    worker.check_health();
    worker.fetch_device(session.select_device("DEV_B"));
    worker.fetch_device(session.select_device("DEV_A"));

    let messages = wait_for_messages(&worker, 4);
    assert_eq!(messages.len(), 4);

    let mut outcomes = Vec::new();
    for message in messages {
        match message {
            FetchMessage::DevicesLoaded(result) => session.apply_devices(result),
            FetchMessage::DeviceLoaded(request, result) => {
                outcomes.push((
                    request.device.clone(),
                    session.apply_device_response(&request, *result),
                ));
            }
            FetchMessage::Health(ok) => assert!(ok),
        }
    }

    outcomes.sort_by(|a, b| a.0.cmp(&b.0));
    assert_eq!(
        outcomes,
        vec![
            ("DEV_A".to_string(), ApplyOutcome::Applied),
            ("DEV_B".to_string(), ApplyOutcome::Stale),
        ]
    );
    assert_eq!(session.devices().len(), 2);
    assert_eq!(session.die_set().map(|d| d.len()), Some(4));
    assert!(session.error().is_none());
}
