use serde::{Deserialize, Serialize};
use std::fmt;

/// Which console surface the user is on.
///
/// The two surfaces historically carried incompatible parameter schemas for
/// the same backend: the advanced console exposed diffusion steps, crossfade
/// and extra context, while the basic console exposed a sample duration (here
/// mapped onto `diffusion_steps`) and a target language, and dims the whole
/// form behind a warm-up dialog while a session starts. The variant is passed
/// in explicitly and otherwise only colors log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleVariant {
    Advanced,
    Basic,
}

impl fmt::Display for ConsoleVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsoleVariant::Advanced => write!(f, "advanced"),
            ConsoleVariant::Basic => write!(f, "basic"),
        }
    }
}

/// The canonical processing configuration pushed to the backend.
///
/// JSON pushes use camelCase keys; the start request flattens the same
/// fields into snake_case multipart form fields. Optional fields belong to
/// one variant each and are omitted from the wire when unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingConfig {
    /// Diffusion steps on the advanced console; the basic console's sample
    /// duration (seconds) maps onto this field.
    pub diffusion_steps: f64,

    /// Processing chunk size in seconds.
    pub chunk_size: f64,

    /// Crossfade length in seconds (advanced console only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crossfade: Option<f64>,

    /// Extra context in seconds (advanced console only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_context: Option<f64>,

    /// Opaque backend-defined id of the capture endpoint.
    pub input_device: String,

    /// Opaque backend-defined id of the playback endpoint.
    pub output_device: String,

    /// Target language code (basic console only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl ProcessingConfig {
    /// Default parameter values for a given console surface.
    pub fn defaults_for(variant: ConsoleVariant) -> Self {
        match variant {
            ConsoleVariant::Advanced => Self {
                diffusion_steps: 20.0,
                chunk_size: 0.5,
                crossfade: Some(0.25),
                extra_context: Some(0.2),
                input_device: String::new(),
                output_device: String::new(),
                language: None,
            },
            ConsoleVariant::Basic => Self {
                diffusion_steps: 2.75,
                chunk_size: 0.5,
                crossfade: None,
                extra_context: None,
                input_device: String::new(),
                output_device: String::new(),
                language: Some("en".to_string()),
            },
        }
    }

    /// Whether both device ids are set.
    pub fn devices_selected(&self) -> bool {
        !self.input_device.is_empty() && !self.output_device.is_empty()
    }
}

/// A single typed edit to one configuration field.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterEdit {
    DiffusionSteps(f64),
    ChunkSize(f64),
    Crossfade(f64),
    ExtraContext(f64),
    InputDevice(String),
    OutputDevice(String),
    Language(String),
}

impl ParameterEdit {
    pub(crate) fn apply(self, config: &mut ProcessingConfig) {
        match self {
            ParameterEdit::DiffusionSteps(v) => config.diffusion_steps = v,
            ParameterEdit::ChunkSize(v) => config.chunk_size = v,
            ParameterEdit::Crossfade(v) => config.crossfade = Some(v),
            ParameterEdit::ExtraContext(v) => config.extra_context = Some(v),
            ParameterEdit::InputDevice(id) => config.input_device = id,
            ParameterEdit::OutputDevice(id) => config.output_device = id,
            ParameterEdit::Language(code) => config.language = Some(code),
        }
    }
}
