use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use vox_console::{
    Config, HttpApiClient, ParameterEdit, ProcessingApi, SelectedFile, SessionController,
    StartOutcome, StopOutcome,
};

/// Headless console for the real-time audio-processing backend.
#[derive(Parser)]
#[command(name = "vox-console", version)]
struct Cli {
    /// Path to the console configuration file (without extension).
    #[arg(long, default_value = "config/vox-console")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Detect and list the backend's audio devices.
    Devices,

    /// Configure and run a processing session until Ctrl-C.
    Run {
        /// Reference audio clip to upload.
        #[arg(long)]
        reference: PathBuf,

        /// Input device id (defaults to the first detected device).
        #[arg(long)]
        input: Option<String>,

        /// Output device id (defaults to the first detected device).
        #[arg(long)]
        output: Option<String>,

        #[arg(long)]
        diffusion_steps: Option<f64>,

        #[arg(long)]
        chunk_size: Option<f64>,

        #[arg(long)]
        crossfade: Option<f64>,

        #[arg(long)]
        extra_context: Option<f64>,

        #[arg(long)]
        language: Option<String>,
    },

    /// Ask the backend to stop whatever session is running.
    Stop,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config).context("Failed to load console configuration")?;

    info!(
        backend = %cfg.backend.base_url,
        variant = %cfg.console.variant,
        "vox-console starting"
    );

    let api = Arc::new(HttpApiClient::new(
        cfg.backend.base_url.clone(),
        cfg.console.variant,
    ));

    match cli.command {
        Command::Devices => devices(api, &cfg).await,
        Command::Run {
            reference,
            input,
            output,
            diffusion_steps,
            chunk_size,
            crossfade,
            extra_context,
            language,
        } => {
            let edits = collect_edits(
                input,
                output,
                diffusion_steps,
                chunk_size,
                crossfade,
                extra_context,
                language,
            );
            run(api, &cfg, reference, edits).await
        }
        Command::Stop => {
            api.stop().await.context("Stop request failed")?;
            info!("Stop request accepted");
            Ok(())
        }
    }
}

async fn devices(api: Arc<HttpApiClient>, cfg: &Config) -> Result<()> {
    let (controller, _notices) = SessionController::new(
        api,
        cfg.console.variant,
        Duration::from_millis(cfg.console.debounce_ms),
    );

    controller.load_devices().await;
    let snapshot = controller.snapshot().await;

    println!("Input devices:");
    for device in &snapshot.input_devices {
        println!("  {:<16} {}", device.id, device.name);
    }
    println!("Output devices:");
    for device in &snapshot.output_devices {
        println!("  {:<16} {}", device.id, device.name);
    }

    controller.close().await;
    Ok(())
}

async fn run(
    api: Arc<HttpApiClient>,
    cfg: &Config,
    reference: PathBuf,
    edits: Vec<ParameterEdit>,
) -> Result<()> {
    let (controller, mut notices) = SessionController::new(
        api,
        cfg.console.variant,
        Duration::from_millis(cfg.console.debounce_ms),
    );

    // Surface the toast stream in the log.
    let notice_task = tokio::spawn(async move {
        while let Some(notice) = notices.recv().await {
            info!(severity = ?notice.severity, "{}", notice.message);
        }
    });

    controller.load_devices().await;

    for edit in edits {
        controller.set_parameter(edit).await;
    }

    let file = SelectedFile::from_path(&reference)?;
    controller.select_file(Some(file)).await;

    let snapshot = controller.snapshot().await;
    if !snapshot.can_start {
        anyhow::bail!(
            "Not ready to start: check that the reference file loaded and that \
             both device ids exist (input={:?}, output={:?})",
            snapshot.config.input_device,
            snapshot.config.output_device
        );
    }

    match controller.start().await {
        StartOutcome::Started => {}
        StartOutcome::NotReady => anyhow::bail!("Start preconditions not met"),
        StartOutcome::Failed => anyhow::bail!("Backend refused to start the session"),
    }

    info!("Session running; press Ctrl-C to stop");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to wait for Ctrl-C")?;

    match controller.stop().await {
        StopOutcome::Stopped => info!("Session stopped"),
        StopOutcome::NotRunning => warn!("No session was running"),
        StopOutcome::Failed => warn!("Stop failed; the session may still be running"),
    }

    controller.close().await;
    notice_task.abort();
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn collect_edits(
    input: Option<String>,
    output: Option<String>,
    diffusion_steps: Option<f64>,
    chunk_size: Option<f64>,
    crossfade: Option<f64>,
    extra_context: Option<f64>,
    language: Option<String>,
) -> Vec<ParameterEdit> {
    let mut edits = Vec::new();
    if let Some(id) = input {
        edits.push(ParameterEdit::InputDevice(id));
    }
    if let Some(id) = output {
        edits.push(ParameterEdit::OutputDevice(id));
    }
    if let Some(v) = diffusion_steps {
        edits.push(ParameterEdit::DiffusionSteps(v));
    }
    if let Some(v) = chunk_size {
        edits.push(ParameterEdit::ChunkSize(v));
    }
    if let Some(v) = crossfade {
        edits.push(ParameterEdit::Crossfade(v));
    }
    if let Some(v) = extra_context {
        edits.push(ParameterEdit::ExtraContext(v));
    }
    if let Some(code) = language {
        edits.push(ParameterEdit::Language(code));
    }
    edits
}
