//! Session configuration and lifecycle control
//!
//! This module provides the `SessionController` abstraction that manages:
//! - The canonical processing configuration and per-variant defaults
//! - The selected reference audio file and its preview resource
//! - Device lists with offline fallbacks
//! - The Idle / Starting / Running lifecycle against the remote backend
//! - Debounced configuration pushes

mod config;
mod controller;
mod file;
mod state;

pub use config::{ConsoleVariant, ParameterEdit, ProcessingConfig};
pub use controller::{
    fallback_input_devices, fallback_output_devices, ControllerSnapshot, FileInfo,
    SessionController, DEFAULT_DEBOUNCE,
};
pub use file::SelectedFile;
pub use state::{Notice, SessionState, Severity, StartOutcome, StopOutcome};
