use crate::api::ReferenceAudio;
use anyhow::{Context, Result};
use std::io::Cursor;
use std::io::Write;
use std::path::Path;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// The user-selected reference audio clip.
///
/// Owns the raw bytes plus derived metadata, and a temporary preview file
/// (the stand-in for the page's transient playback URL). The preview file is
/// deleted when the selection is replaced or dropped, on every exit path.
pub struct SelectedFile {
    name: String,
    bytes: Vec<u8>,
    duration_secs: Option<f64>,
    preview: NamedTempFile,
}

impl SelectedFile {
    /// Wrap an uploaded clip. Probes the container for its duration (best
    /// effort; unprobeable uploads simply carry no duration) and materializes
    /// the preview file.
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        let name = name.into();

        let mut builder = tempfile::Builder::new();
        builder.prefix("vox-preview-");
        let suffix = Path::new(&name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{e}"));
        if let Some(suffix) = &suffix {
            builder.suffix(suffix);
        }
        let mut preview = builder
            .tempfile()
            .context("Failed to create preview file")?;
        preview
            .write_all(&bytes)
            .context("Failed to write preview file")?;

        let duration_secs = probe_duration(&name, &bytes);

        info!(
            name = %name,
            size_bytes = bytes.len(),
            duration_secs = ?duration_secs,
            "Reference audio selected"
        );

        Ok(Self {
            name,
            bytes,
            duration_secs,
            preview,
        })
    }

    /// Read a clip from disk (CLI path).
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read reference audio {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "reference".to_string());
        Self::from_bytes(name, bytes)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Decoded clip length in seconds, when the container could be probed.
    pub fn duration_secs(&self) -> Option<f64> {
        self.duration_secs
    }

    /// Path of the transient preview resource. Valid until this selection is
    /// replaced or dropped.
    pub fn preview_path(&self) -> &Path {
        self.preview.path()
    }

    /// Payload for the start request.
    pub fn reference(&self) -> ReferenceAudio {
        ReferenceAudio {
            file_name: self.name.clone(),
            bytes: self.bytes.clone(),
        }
    }
}

/// Probe the clip's duration without decoding it in full.
fn probe_duration(name: &str, bytes: &[u8]) -> Option<f64> {
    let mut hint = Hint::new();
    if let Some(ext) = Path::new(name).extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let source = MediaSourceStream::new(
        Box::new(Cursor::new(bytes.to_vec())),
        Default::default(),
    );

    let probed = match symphonia::default::get_probe().format(
        &hint,
        source,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    ) {
        Ok(probed) => probed,
        Err(e) => {
            warn!(name = %name, "Could not probe reference audio: {}", e);
            return None;
        }
    };

    let track = probed.format.default_track()?;
    let params = &track.codec_params;

    let n_frames = params.n_frames?;
    let duration = if let Some(time_base) = params.time_base {
        let time = time_base.calc_time(n_frames);
        time.seconds as f64 + time.frac
    } else {
        n_frames as f64 / params.sample_rate? as f64
    };

    debug!(name = %name, duration_secs = duration, "Probed reference audio");
    Some(duration)
}
