use serde::{Deserialize, Serialize};

/// An addressable audio endpoint reported by the backend.
///
/// The id is opaque and backend-defined; only the name is meant for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub name: String,
}

impl Device {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Response of `GET /detect-devices`. Lists are replaced wholesale on each
/// detection call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceLists {
    pub input_devices: Vec<Device>,
    pub output_devices: Vec<Device>,
}

/// Reference audio payload attached to a start request.
#[derive(Debug, Clone)]
pub struct ReferenceAudio {
    /// Original file name, forwarded as the multipart part's file name.
    pub file_name: String,
    pub bytes: Vec<u8>,
}
