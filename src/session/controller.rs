use super::config::{ConsoleVariant, ParameterEdit, ProcessingConfig};
use super::file::SelectedFile;
use super::state::{Notice, SessionState, StartOutcome, StopOutcome};
use crate::api::{Device, ProcessingApi};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Quiet period between the last edit and the config push.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Devices installed when detection fails, so the console stays usable
/// offline.
pub fn fallback_input_devices() -> Vec<Device> {
    vec![
        Device::new("default", "Default Microphone"),
        Device::new("mic1", "USB Microphone"),
        Device::new("mic2", "Built-in Microphone"),
    ]
}

pub fn fallback_output_devices() -> Vec<Device> {
    vec![
        Device::new("default", "Default Speakers"),
        Device::new("speakers1", "Desktop Speakers"),
        Device::new("headphones", "Bluetooth Headphones"),
    ]
}

/// Form and lifecycle state, all behind one lock: the controller is the
/// single owner of every mutable piece.
struct FormState {
    config: ProcessingConfig,
    selected_file: Option<SelectedFile>,
    input_devices: Vec<Device>,
    output_devices: Vec<Device>,
    lifecycle: SessionState,
    /// Set under the lock before the stop request goes out, so a concurrent
    /// stop() observes it and does not issue a second request.
    stopping: bool,
    session_id: Option<String>,
}

impl FormState {
    /// Start preconditions: a reference file, and both device ids set and
    /// present in the last-fetched lists.
    fn ready_to_start(&self) -> bool {
        self.selected_file.is_some()
            && self.config.devices_selected()
            && self
                .input_devices
                .iter()
                .any(|d| d.id == self.config.input_device)
            && self
                .output_devices
                .iter()
                .any(|d| d.id == self.config.output_device)
    }
}

/// Summary of the selected file for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct FileInfo {
    pub name: String,
    pub size_bytes: u64,
    pub duration_secs: Option<f64>,
}

/// Read-only view of the controller for rendering forms and buttons.
#[derive(Debug, Clone)]
pub struct ControllerSnapshot {
    pub lifecycle: SessionState,
    pub config: ProcessingConfig,
    pub input_devices: Vec<Device>,
    pub output_devices: Vec<Device>,
    pub selected_file: Option<FileInfo>,
    pub session_id: Option<String>,
    pub can_start: bool,
}

/// Owns the console's form state and drives the remote session lifecycle.
///
/// All mutable state lives behind a single mutex; the lifecycle is checked
/// and flipped under that lock before any network await, which is what makes
/// start/stop non-reentrant. Parameter edits schedule a debounced config
/// push; a newer edit supersedes the pending one.
pub struct SessionController {
    api: Arc<dyn ProcessingApi>,
    variant: ConsoleVariant,
    debounce: Duration,
    form: Arc<Mutex<FormState>>,
    pending_push: Arc<Mutex<Option<JoinHandle<()>>>>,
    device_generation: Arc<AtomicU64>,
    notices: mpsc::UnboundedSender<Notice>,
}

impl SessionController {
    /// Create a controller bound to a backend client. Returns the controller
    /// and the notice stream the UI renders as toasts.
    pub fn new(
        api: Arc<dyn ProcessingApi>,
        variant: ConsoleVariant,
        debounce: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (notices, notice_rx) = mpsc::unbounded_channel();

        let controller = Self {
            api,
            variant,
            debounce,
            form: Arc::new(Mutex::new(FormState {
                config: ProcessingConfig::defaults_for(variant),
                selected_file: None,
                input_devices: Vec::new(),
                output_devices: Vec::new(),
                lifecycle: SessionState::Idle,
                stopping: false,
                session_id: None,
            })),
            pending_push: Arc::new(Mutex::new(None)),
            device_generation: Arc::new(AtomicU64::new(0)),
            notices,
        };

        (controller, notice_rx)
    }

    pub fn variant(&self) -> ConsoleVariant {
        self.variant
    }

    /// Apply one configuration edit and schedule a debounced push.
    ///
    /// Returns false (and changes nothing) while the session is Starting:
    /// the form is disabled during warm-up.
    pub async fn set_parameter(&self, edit: ParameterEdit) -> bool {
        {
            let mut form = self.form.lock().await;
            if form.lifecycle == SessionState::Starting {
                debug!(variant = %self.variant, ?edit, "Edit rejected during warm-up");
                return false;
            }
            edit.apply(&mut form.config);
        }

        self.schedule_push().await;
        true
    }

    /// Replace the selected reference file. The previous selection's preview
    /// resource is released as it is dropped. Rejected during warm-up.
    pub async fn select_file(&self, file: Option<SelectedFile>) -> bool {
        let mut form = self.form.lock().await;
        if form.lifecycle == SessionState::Starting {
            debug!(variant = %self.variant, "File selection rejected during warm-up");
            return false;
        }
        form.selected_file = file;
        true
    }

    /// Fetch the backend's device lists, replacing both wholesale.
    ///
    /// On failure the fixed fallback lists are installed so the console
    /// stays usable, and a warning notice is emitted. Either way the first
    /// entry of each list is auto-selected when no device was chosen yet.
    /// Responses are sequenced: a stale response (an earlier call resolving
    /// after a later one) is discarded.
    pub async fn load_devices(&self) {
        {
            // The whole form is frozen during warm-up, device lists included.
            let form = self.form.lock().await;
            if form.lifecycle == SessionState::Starting {
                debug!(variant = %self.variant, "Device detection rejected during warm-up");
                return;
            }
        }

        let generation = self.device_generation.fetch_add(1, Ordering::SeqCst) + 1;

        let lists = match self.api.detect_devices().await {
            Ok(lists) => lists,
            Err(e) => {
                warn!(variant = %self.variant, "Device detection failed: {}", e);
                self.notify(Notice::warning(
                    "Failed to detect audio devices. Using defaults.",
                ));
                crate::api::DeviceLists {
                    input_devices: fallback_input_devices(),
                    output_devices: fallback_output_devices(),
                }
            }
        };

        let auto_selected = {
            let mut form = self.form.lock().await;
            if self.device_generation.load(Ordering::SeqCst) != generation {
                debug!(generation, "Discarding stale device detection response");
                return;
            }

            form.input_devices = lists.input_devices;
            form.output_devices = lists.output_devices;

            let mut auto_selected = false;
            if form.config.input_device.is_empty() {
                if let Some(first) = form.input_devices.first() {
                    form.config.input_device = first.id.clone();
                    auto_selected = true;
                }
            }
            if form.config.output_device.is_empty() {
                if let Some(first) = form.output_devices.first() {
                    form.config.output_device = first.id.clone();
                    auto_selected = true;
                }
            }
            auto_selected
        };

        // Auto-selection is a device edit like any other.
        if auto_selected {
            self.schedule_push().await;
        }
    }

    /// Start the remote session.
    ///
    /// Precondition violations are `NotReady`, not errors: nothing is sent
    /// and nothing changes. Otherwise the lifecycle moves to Starting before
    /// the request, freezing the form for the warm-up, then to Running on
    /// success or back to Idle on failure.
    pub async fn start(&self) -> StartOutcome {
        let (config, reference) = {
            let mut form = self.form.lock().await;
            if form.lifecycle != SessionState::Idle || !form.ready_to_start() {
                debug!(
                    variant = %self.variant,
                    lifecycle = ?form.lifecycle,
                    "Start not ready"
                );
                return StartOutcome::NotReady;
            }
            form.lifecycle = SessionState::Starting;
            (
                form.config.clone(),
                form.selected_file.as_ref().map(|f| f.reference()),
            )
        };

        // The form is frozen now; a queued push would be stale anyway.
        self.cancel_pending_push().await;

        info!(variant = %self.variant, "Starting session (warm-up)");

        match self.api.start(&config, reference.as_ref()).await {
            Ok(()) => {
                let session_id = format!("session-{}", uuid::Uuid::new_v4());
                let mut form = self.form.lock().await;
                form.lifecycle = SessionState::Running;
                form.session_id = Some(session_id.clone());
                info!(session_id = %session_id, "Session running");
                self.notify(Notice::info("Audio processing started."));
                StartOutcome::Started
            }
            Err(e) => {
                let mut form = self.form.lock().await;
                form.lifecycle = SessionState::Idle;
                error!(variant = %self.variant, "Failed to start session: {}", e);
                self.notify(Notice::error(format!("Failed to start processing: {e}")));
                StartOutcome::Failed
            }
        }
    }

    /// Stop the Running session. On failure the session stays Running so the
    /// user may retry.
    pub async fn stop(&self) -> StopOutcome {
        {
            // Like start(), the in-flight marker is set under the lock before
            // the network await: exactly one stop request per observed
            // Running state.
            let mut form = self.form.lock().await;
            if form.lifecycle != SessionState::Running || form.stopping {
                debug!(
                    lifecycle = ?form.lifecycle,
                    stopping = form.stopping,
                    "Stop ignored: no stoppable session"
                );
                return StopOutcome::NotRunning;
            }
            form.stopping = true;
        }

        match self.api.stop().await {
            Ok(()) => {
                let mut form = self.form.lock().await;
                form.stopping = false;
                form.lifecycle = SessionState::Idle;
                let session_id = form.session_id.take();
                info!(session_id = ?session_id, "Session stopped");
                self.notify(Notice::info("Audio processing stopped."));
                StopOutcome::Stopped
            }
            Err(e) => {
                let mut form = self.form.lock().await;
                form.stopping = false;
                error!(variant = %self.variant, "Failed to stop session: {}", e);
                self.notify(Notice::error(format!("Failed to stop processing: {e}")));
                StopOutcome::Failed
            }
        }
    }

    /// Read-only view for rendering.
    pub async fn snapshot(&self) -> ControllerSnapshot {
        let form = self.form.lock().await;
        ControllerSnapshot {
            lifecycle: form.lifecycle,
            config: form.config.clone(),
            input_devices: form.input_devices.clone(),
            output_devices: form.output_devices.clone(),
            selected_file: form.selected_file.as_ref().map(|f| FileInfo {
                name: f.name().to_string(),
                size_bytes: f.size_bytes(),
                duration_secs: f.duration_secs(),
            }),
            session_id: form.session_id.clone(),
            can_start: form.lifecycle == SessionState::Idle && form.ready_to_start(),
        }
    }

    /// View teardown: cancel any pending push and drop the file selection
    /// (releasing its preview resource).
    pub async fn close(&self) {
        self.cancel_pending_push().await;
        let mut form = self.form.lock().await;
        form.selected_file = None;
    }

    /// Supersede any pending push and schedule a new one after the quiet
    /// period. The task snapshots the config when the timer fires, so the
    /// push always carries the last-set values.
    async fn schedule_push(&self) {
        let mut pending = self.pending_push.lock().await;
        if let Some(task) = pending.take() {
            task.abort();
        }

        let api = Arc::clone(&self.api);
        let form = Arc::clone(&self.form);
        let notices = self.notices.clone();
        let debounce = self.debounce;

        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;

            let config = {
                let form = form.lock().await;
                if form.lifecycle == SessionState::Starting {
                    return;
                }
                form.config.clone()
            };

            // Fire and forget: a failed push never touches the lifecycle.
            if let Err(e) = api.update_config(&config).await {
                warn!("Config push failed: {}", e);
                let _ = notices.send(Notice::warning(format!("Failed to sync settings: {e}")));
            } else {
                debug!("Config push delivered");
            }
        }));
    }

    async fn cancel_pending_push(&self) {
        let mut pending = self.pending_push.lock().await;
        if let Some(task) = pending.take() {
            task.abort();
        }
    }

    fn notify(&self, notice: Notice) {
        // The receiver may be gone during teardown; that is fine.
        let _ = self.notices.send(notice);
    }
}
