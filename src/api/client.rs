use super::error::ApiError;
use super::types::{DeviceLists, ReferenceAudio};
use crate::session::{ConsoleVariant, ProcessingConfig};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use tracing::{debug, info};

/// The four operations the processing backend exposes.
///
/// The controller only ever talks to this trait, so tests can substitute a
/// scripted double for the real HTTP client.
#[async_trait::async_trait]
pub trait ProcessingApi: Send + Sync {
    /// Ask the backend to enumerate audio endpoints.
    async fn detect_devices(&self) -> Result<DeviceLists, ApiError>;

    /// Push the current (partial) configuration. Best effort: callers treat
    /// failures as non-fatal.
    async fn update_config(&self, config: &ProcessingConfig) -> Result<(), ApiError>;

    /// Start a processing session with the full configuration and the
    /// optional reference audio attachment.
    async fn start(
        &self,
        config: &ProcessingConfig,
        reference: Option<&ReferenceAudio>,
    ) -> Result<(), ApiError>;

    /// Stop the running session. Idempotent from the client's point of view.
    async fn stop(&self) -> Result<(), ApiError>;
}

/// HTTP implementation of [`ProcessingApi`].
///
/// Stateless apart from the injected base URL and the console variant tag,
/// which is carried only as logging context. No retries, no caching, and no
/// timeout beyond the client default.
pub struct HttpApiClient {
    http: Client,
    base_url: String,
    variant: ConsoleVariant,
}

impl HttpApiClient {
    pub fn new(base_url: impl Into<String>, variant: ConsoleVariant) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: Client::new(),
            base_url,
            variant,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Map a non-2xx response to `ApiError::Backend`, preferring the response
    /// body as the message so the backend's own wording reaches the user.
    async fn check_status(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = match response.text().await {
            Ok(body) if !body.trim().is_empty() => body.trim().to_string(),
            _ => status_text(status),
        };
        Err(ApiError::Backend {
            status: status.as_u16(),
            message,
        })
    }
}

fn status_text(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("unknown error")
        .to_string()
}

#[async_trait::async_trait]
impl ProcessingApi for HttpApiClient {
    async fn detect_devices(&self) -> Result<DeviceLists, ApiError> {
        debug!(variant = %self.variant, "Detecting audio devices");

        let response = self.http.get(self.url("/detect-devices")).send().await?;
        let response = Self::check_status(response).await?;
        let lists: DeviceLists = response.json().await?;

        info!(
            inputs = lists.input_devices.len(),
            outputs = lists.output_devices.len(),
            "Device detection completed"
        );

        Ok(lists)
    }

    async fn update_config(&self, config: &ProcessingConfig) -> Result<(), ApiError> {
        debug!(variant = %self.variant, "Pushing configuration update");

        let response = self
            .http
            .post(self.url("/config"))
            .json(config)
            .send()
            .await?;
        Self::check_status(response).await?;

        Ok(())
    }

    async fn start(
        &self,
        config: &ProcessingConfig,
        reference: Option<&ReferenceAudio>,
    ) -> Result<(), ApiError> {
        info!(
            variant = %self.variant,
            input = %config.input_device,
            output = %config.output_device,
            has_reference = reference.is_some(),
            "Starting processing session"
        );

        let mut form = Form::new()
            .text("diffusion_steps", config.diffusion_steps.to_string())
            .text("chunk_size", config.chunk_size.to_string())
            .text("input_device", config.input_device.clone())
            .text("output_device", config.output_device.clone());

        if let Some(crossfade) = config.crossfade {
            form = form.text("crossfade", crossfade.to_string());
        }
        if let Some(extra_context) = config.extra_context {
            form = form.text("extra_context", extra_context.to_string());
        }
        if let Some(language) = &config.language {
            form = form.text("language", language.clone());
        }
        if let Some(reference) = reference {
            let part = Part::bytes(reference.bytes.clone()).file_name(reference.file_name.clone());
            form = form.part("reference_audio", part);
        }

        let response = self
            .http
            .post(self.url("/start"))
            .multipart(form)
            .send()
            .await?;
        Self::check_status(response).await?;

        Ok(())
    }

    async fn stop(&self) -> Result<(), ApiError> {
        info!(variant = %self.variant, "Stopping processing session");

        let response = self.http.post(self.url("/stop")).send().await?;
        Self::check_status(response).await?;

        Ok(())
    }
}
