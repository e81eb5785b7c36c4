use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use mockview_core::{ControllerConfig, SessionController, SessionRegistry, TurnGenerator};
use mockview_llm::{CompletionProvider, SpeechToText, TextToSpeech};
use tokio::signal;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use crate::apis;

pub const DEFAULT_MAX_AUDIO_BYTES: usize = 10 * 1024 * 1024;

/// Configuration for the HTTP server
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Server bind address (e.g., "0.0.0.0:8080")
    pub address: String,
    /// Response mode when a request does not pick one
    pub stream_by_default: bool,
    /// Upper bound for `/stt` request bodies
    pub max_audio_bytes: usize,
    pub controller: ControllerConfig,
}

impl ServerConfig {
    /// Create a new server config with the given address and defaults for everything else
    pub fn new(address: String) -> Self {
        Self {
            address,
            stream_by_default: true,
            max_audio_bytes: DEFAULT_MAX_AUDIO_BYTES,
            controller: ControllerConfig::default(),
        }
    }

    pub fn with_stream_by_default(mut self, stream: bool) -> Self {
        self.stream_by_default = stream;
        self
    }

    pub fn with_controller(mut self, controller: ControllerConfig) -> Self {
        self.controller = controller;
        self
    }

    pub fn with_max_audio_bytes(mut self, max_audio_bytes: usize) -> Self {
        self.max_audio_bytes = max_audio_bytes;
        self
    }
}

/// Shared handler state
#[derive(Clone)]
pub struct ServerState {
    pub controller: Arc<SessionController>,
    pub stt: Arc<dyn SpeechToText>,
    pub tts: Arc<dyn TextToSpeech>,
    pub stream_by_default: bool,
    pub max_audio_bytes: usize,
}

impl ServerState {
    /// Wire an empty registry and the given backends
    pub fn new(
        config: &ServerConfig,
        completion: Arc<dyn CompletionProvider>,
        stt: Arc<dyn SpeechToText>,
        tts: Arc<dyn TextToSpeech>,
    ) -> Self {
        let controller = SessionController::new(
            SessionRegistry::new(),
            TurnGenerator::new(completion),
            config.controller.clone(),
        );
        Self {
            controller: Arc::new(controller),
            stt,
            tts,
            stream_by_default: config.stream_by_default,
            max_audio_bytes: config.max_audio_bytes,
        }
    }
}

pub fn router(state: ServerState) -> Router {
    let max_audio_bytes = state.max_audio_bytes;

    Router::new()
        .route("/health", get(apis::health::handle_health))
        // Interview
        .route("/start", post(apis::interview::handle_start))
        .route(
            "/chat/{session_id}",
            post(apis::interview::handle_chat)
                .get(apis::interview::handle_get_session)
                .delete(apis::interview::handle_close_session),
        )
        // Speech
        .route(
            "/stt",
            post(apis::speech::handle_stt).layer(DefaultBodyLimit::max(max_audio_bytes)),
        )
        .route("/tts", post(apis::speech::handle_tts))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the HTTP server and run until Ctrl+C or SIGTERM
pub async fn start_server(
    config: ServerConfig,
    completion: Arc<dyn CompletionProvider>,
    stt: Arc<dyn SpeechToText>,
    tts: Arc<dyn TextToSpeech>,
) -> anyhow::Result<()> {
    let state = ServerState::new(&config, completion, stt, tts);

    println!("✓ Session registry initialized");
    println!(
        "  Default time limit: \x1b[1m{}s\x1b[0m",
        config.controller.default_time_limit.as_secs()
    );
    println!(
        "  Default mode: \x1b[1m{}\x1b[0m",
        if config.stream_by_default { "streaming" } else { "buffered" }
    );
    println!();

    let app = router(state);
    let listener = tokio::net::TcpListener::bind(&config.address).await?;

    // Print server info
    println!("Server starting on \x1b[1mhttp://{}\x1b[0m", config.address);
    println!("\nAvailable endpoints:");
    println!("  \x1b[1mGET    /health\x1b[0m                 - Liveness probe");
    println!("  \x1b[1mPOST   /start\x1b[0m                  - Start an interview");
    println!("  \x1b[1mPOST   /chat/:session_id\x1b[0m       - Reply to the interviewer");
    println!("  \x1b[1mGET    /chat/:session_id\x1b[0m       - Session status and transcript");
    println!("  \x1b[1mDELETE /chat/:session_id\x1b[0m       - End an interview");
    println!("  \x1b[1mPOST   /stt\x1b[0m                    - Speech to text (multipart 'audio')");
    println!("  \x1b[1mPOST   /tts\x1b[0m                    - Text to speech");
    println!("\nPress Ctrl+C to stop\n");

    info!("HTTP server listening on {}", config.address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
        _ = terminate => info!("Received SIGTERM, shutting down..."),
    }
}
