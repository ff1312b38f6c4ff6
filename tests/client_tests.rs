// Wire tests for the HTTP client against a stub backend. The stub records
// what actually arrived on each route so the tests can assert on payload
// shape, not just on status handling.

use anyhow::Result;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use tokio::sync::Mutex;
use vox_console::{
    ApiError, ConsoleVariant, Device, DeviceLists, HttpApiClient, ProcessingApi, ProcessingConfig,
    ReferenceAudio,
};

#[derive(Debug, Clone)]
struct StartField {
    name: String,
    file_name: Option<String>,
    bytes: Vec<u8>,
}

#[derive(Default)]
struct Recorded {
    config_bodies: Vec<serde_json::Value>,
    start_fields: Vec<StartField>,
    stop_count: usize,
}

type Shared = Arc<Mutex<Recorded>>;

async fn detect_devices() -> Json<DeviceLists> {
    Json(DeviceLists {
        input_devices: vec![
            Device::new("mic-a", "Studio Microphone"),
            Device::new("mic-b", "Interface Input 2"),
        ],
        output_devices: vec![Device::new("monitors", "Studio Monitors")],
    })
}

async fn record_config(
    State(recorded): State<Shared>,
    Json(body): Json<serde_json::Value>,
) -> StatusCode {
    recorded.lock().await.config_bodies.push(body);
    StatusCode::OK
}

async fn record_start(State(recorded): State<Shared>, mut multipart: Multipart) -> StatusCode {
    let mut fields = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(|f| f.to_string());
        let bytes = field.bytes().await.unwrap().to_vec();
        fields.push(StartField {
            name,
            file_name,
            bytes,
        });
    }
    recorded.lock().await.start_fields = fields;
    StatusCode::OK
}

async fn record_stop(State(recorded): State<Shared>) -> StatusCode {
    recorded.lock().await.stop_count += 1;
    StatusCode::OK
}

/// Bind the stub on an ephemeral port and return its base URL.
async fn spawn_backend(router: Router) -> Result<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });
    Ok(format!("http://{addr}"))
}

async fn spawn_recording_backend() -> Result<(String, Shared)> {
    let recorded: Shared = Arc::new(Mutex::new(Recorded::default()));
    let router = Router::new()
        .route("/detect-devices", get(detect_devices))
        .route("/config", post(record_config))
        .route("/start", post(record_start))
        .route("/stop", post(record_stop))
        .with_state(Arc::clone(&recorded));
    let base_url = spawn_backend(router).await?;
    Ok((base_url, recorded))
}

fn text_field<'a>(fields: &'a [StartField], name: &str) -> Option<&'a str> {
    fields
        .iter()
        .find(|f| f.name == name)
        .map(|f| std::str::from_utf8(&f.bytes).unwrap())
}

#[tokio::test]
async fn detect_devices_parses_both_lists() -> Result<()> {
    let (base_url, _recorded) = spawn_recording_backend().await?;
    let client = HttpApiClient::new(base_url, ConsoleVariant::Advanced);

    let lists = client.detect_devices().await?;

    assert_eq!(lists.input_devices.len(), 2);
    assert_eq!(lists.input_devices[0], Device::new("mic-a", "Studio Microphone"));
    assert_eq!(lists.output_devices.len(), 1);

    Ok(())
}

#[tokio::test]
async fn update_config_posts_camel_case_json_and_omits_unset_fields() -> Result<()> {
    let (base_url, recorded) = spawn_recording_backend().await?;
    let client = HttpApiClient::new(base_url, ConsoleVariant::Basic);

    let mut config = ProcessingConfig::defaults_for(ConsoleVariant::Basic);
    config.input_device = "mic-a".to_string();
    config.output_device = "monitors".to_string();
    client.update_config(&config).await?;

    let recorded = recorded.lock().await;
    assert_eq!(recorded.config_bodies.len(), 1);
    let body = &recorded.config_bodies[0];

    assert_eq!(body["diffusionSteps"], 2.75);
    assert_eq!(body["chunkSize"], 0.5);
    assert_eq!(body["inputDevice"], "mic-a");
    assert_eq!(body["outputDevice"], "monitors");
    assert_eq!(body["language"], "en");
    // Advanced-only fields stay off the wire for the basic variant.
    assert!(body.get("crossfade").is_none());
    assert!(body.get("extraContext").is_none());

    Ok(())
}

#[tokio::test]
async fn start_sends_multipart_fields_and_reference_attachment() -> Result<()> {
    let (base_url, recorded) = spawn_recording_backend().await?;
    let client = HttpApiClient::new(base_url, ConsoleVariant::Advanced);

    let mut config = ProcessingConfig::defaults_for(ConsoleVariant::Advanced);
    config.input_device = "mic-a".to_string();
    config.output_device = "monitors".to_string();

    let reference = ReferenceAudio {
        file_name: "song.mp3".to_string(),
        bytes: vec![0x11; 4096],
    };
    client.start(&config, Some(&reference)).await?;

    let recorded = recorded.lock().await;
    let fields = &recorded.start_fields;

    assert_eq!(text_field(fields, "diffusion_steps"), Some("20"));
    assert_eq!(text_field(fields, "chunk_size"), Some("0.5"));
    assert_eq!(text_field(fields, "crossfade"), Some("0.25"));
    assert_eq!(text_field(fields, "extra_context"), Some("0.2"));
    assert_eq!(text_field(fields, "input_device"), Some("mic-a"));
    assert_eq!(text_field(fields, "output_device"), Some("monitors"));
    assert!(text_field(fields, "language").is_none());

    let attachment = fields
        .iter()
        .find(|f| f.name == "reference_audio")
        .expect("reference_audio part must be present");
    assert_eq!(attachment.file_name.as_deref(), Some("song.mp3"));
    assert_eq!(attachment.bytes.len(), 4096);

    Ok(())
}

#[tokio::test]
async fn start_without_reference_omits_the_attachment() -> Result<()> {
    let (base_url, recorded) = spawn_recording_backend().await?;
    let client = HttpApiClient::new(base_url, ConsoleVariant::Advanced);

    let mut config = ProcessingConfig::defaults_for(ConsoleVariant::Advanced);
    config.input_device = "mic-a".to_string();
    config.output_device = "monitors".to_string();
    client.start(&config, None).await?;

    let recorded = recorded.lock().await;
    assert!(recorded
        .start_fields
        .iter()
        .all(|f| f.name != "reference_audio"));

    Ok(())
}

#[tokio::test]
async fn stop_posts_to_the_stop_route() -> Result<()> {
    let (base_url, recorded) = spawn_recording_backend().await?;
    let client = HttpApiClient::new(base_url, ConsoleVariant::Basic);

    client.stop().await?;
    client.stop().await?; // idempotent from the client's point of view

    assert_eq!(recorded.lock().await.stop_count, 2);
    Ok(())
}

#[tokio::test]
async fn non_2xx_surfaces_backend_message_verbatim() -> Result<()> {
    let router = Router::new().route(
        "/start",
        post(|| async { (StatusCode::BAD_REQUEST, "invalid device id: ghost") }),
    );
    let base_url = spawn_backend(router).await?;
    let client = HttpApiClient::new(base_url, ConsoleVariant::Advanced);

    let config = ProcessingConfig::defaults_for(ConsoleVariant::Advanced);
    let err = client.start(&config, None).await.unwrap_err();

    match err {
        ApiError::Backend { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "invalid device id: ghost");
        }
        other => panic!("expected backend error, got {other:?}"),
    }

    Ok(())
}

#[tokio::test]
async fn empty_error_body_falls_back_to_status_text() -> Result<()> {
    let router = Router::new().route(
        "/stop",
        post(|| async { StatusCode::SERVICE_UNAVAILABLE }),
    );
    let base_url = spawn_backend(router).await?;
    let client = HttpApiClient::new(base_url, ConsoleVariant::Advanced);

    let err = client.stop().await.unwrap_err();
    match err {
        ApiError::Backend { status, message } => {
            assert_eq!(status, 503);
            assert_eq!(message, "Service Unavailable");
        }
        other => panic!("expected backend error, got {other:?}"),
    }

    Ok(())
}

#[tokio::test]
async fn unreachable_backend_yields_a_network_error() {
    // Nothing listens on port 9; the connection is refused locally.
    let client = HttpApiClient::new("http://127.0.0.1:9", ConsoleVariant::Advanced);

    let err = client.stop().await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)), "got {err:?}");
    assert!(!err.is_rejection());
}
