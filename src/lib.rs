pub mod api;
pub mod config;
pub mod session;

pub use api::{ApiError, Device, DeviceLists, HttpApiClient, ProcessingApi, ReferenceAudio};
pub use config::Config;
pub use session::{
    ConsoleVariant, ControllerSnapshot, Notice, ParameterEdit, ProcessingConfig, SelectedFile,
    SessionController, SessionState, StartOutcome, StopOutcome,
};
