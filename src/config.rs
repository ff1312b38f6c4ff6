use crate::session::{ConsoleVariant, DEFAULT_DEBOUNCE};
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub backend: BackendConfig,
    pub console: ConsoleConfig,
}

#[derive(Debug, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the audio-processing backend, e.g. "http://localhost:8000".
    pub base_url: String,
}

#[derive(Debug, Deserialize)]
pub struct ConsoleConfig {
    /// Which console surface this instance presents.
    pub variant: ConsoleVariant,

    /// Quiet period between the last edit and the config push.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE.as_millis() as u64
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
