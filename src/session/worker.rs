// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Background fetches
//!
//! Each request runs on its own thread and reports back over a channel that the UI
//! polls every frame. Nothing is cancelled; ordering is sorted out by the session.

use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use super::api::{DeviceModsResponse, EtestBackend};
use super::DeviceRequest;

#[derive(Debug)]
pub enum FetchMessage {
    DevicesLoaded(Result<Vec<String>, String>),
    DeviceLoaded(DeviceRequest, Box<Result<DeviceModsResponse, String>>),
    Health(bool),
}

pub struct FetchWorker {
    backend: Arc<dyn EtestBackend>,
    sender: mpsc::Sender<FetchMessage>,
    receiver: mpsc::Receiver<FetchMessage>,
}

impl FetchWorker {
    pub fn new(backend: Arc<dyn EtestBackend>) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            backend,
            sender,
            receiver,
        }
    }

    fn spawn<F>(&self, job: F)
    where
        F: FnOnce(&dyn EtestBackend) -> FetchMessage + Send + 'static,
    {
        let backend = Arc::clone(&self.backend);
        let sender = self.sender.clone();
        thread::spawn(move || {
            let message = job(backend.as_ref());
            // The receiver only goes away when the app is shutting down.
            let _ = sender.send(message);
        });
    }

    pub fn fetch_devices(&self) {
        self.spawn(|backend| {
            FetchMessage::DevicesLoaded(backend.list_devices().map_err(|e| e.to_string()))
        });
    }

    pub fn fetch_device(&self, request: DeviceRequest) {
        self.spawn(move |backend| {
            let result = backend
                .device_mods(&request.device)
                .map_err(|e| e.to_string());
            FetchMessage::DeviceLoaded(request, Box::new(result))
        });
    }

    pub fn check_health(&self) {
        self.spawn(|backend| FetchMessage::Health(backend.health().unwrap_or(false)));
    }

    /// Drain every message that has arrived so far.
    pub fn poll(&self) -> Vec<FetchMessage> {
        self.receiver.try_iter().collect()
    }
}
