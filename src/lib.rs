//! E-test Wafer Viewer Library
//!
//! This library provides the wafer die-layout engine, die selection, and the device
//! session logic behind the e-test program generator's wafer map.

pub mod config;
pub mod export;
pub mod filter;
pub mod gui;
pub mod selection;
pub mod session;
pub mod wafer;
pub mod wafer_map;

// Re-export commonly used types
pub use selection::SelectionModel;
pub use session::{DeviceSession, SubmissionPayload};
pub use wafer::{Die, DieSet, WaferMeta};
