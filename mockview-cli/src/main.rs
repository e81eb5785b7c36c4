use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{ArgAction, Parser};
use mockview_core::{init_logging, ControllerConfig, LogConfig, LogFormat};
use mockview_http::{start_server, ServerConfig, DEFAULT_MAX_AUDIO_BYTES};
use mockview_llm::gemini::DEFAULT_MODEL;
use mockview_llm::{GeminiConfig, GeminiProvider, GoogleSpeechClient, SpeechConfig};
use tracing::{error, info};

/// Timed mock interviews about an article, over HTTP
#[derive(Parser, Debug)]
#[command(name = "mockview", version, about, long_about = None)]
struct Cli {
    /// Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    port: u16,

    /// Google API key used for Gemini and Cloud Speech
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    api_key: String,

    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Override the Gemini API root
    #[arg(long, env = "GEMINI_BASE_URL")]
    gemini_base_url: Option<String>,

    /// Let the model fetch the article itself
    #[arg(long, env = "GEMINI_URL_CONTEXT", default_value_t = true, action = ArgAction::Set)]
    url_context: bool,

    /// Interview length when a client sends none
    #[arg(long, env = "DEFAULT_TIME_LIMIT_SECONDS", default_value_t = 300)]
    default_time_limit: u64,

    /// Stream replies unless a request says otherwise
    #[arg(long, env = "STREAM_BY_DEFAULT", default_value_t = true, action = ArgAction::Set)]
    stream: bool,

    #[arg(long, env = "SPEECH_LANGUAGE_CODE", default_value = "en-US")]
    language_code: String,

    #[arg(long, env = "SPEECH_RECOGNITION_MODEL", default_value = "telephony")]
    recognition_model: String,

    #[arg(long, env = "SPEECH_VOICE", default_value = "en-US-Wavenet-F")]
    voice: String,

    #[arg(long, env = "MAX_AUDIO_BYTES", default_value_t = DEFAULT_MAX_AUDIO_BYTES)]
    max_audio_bytes: usize,

    /// Log filter directives
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    log_filter: String,

    /// plain or json
    #[arg(long, env = "LOG_FORMAT", default_value = "plain")]
    log_format: LogFormat,

    /// Log to this file instead of stdout
    #[arg(long, env = "LOG_FILE")]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn log_config(&self) -> LogConfig {
        LogConfig {
            filter: self.log_filter.clone(),
            format: self.log_format,
            file: self.log_file.clone(),
        }
    }

    fn server_config(&self) -> ServerConfig {
        ServerConfig::new(format!("{}:{}", self.host, self.port))
            .with_stream_by_default(self.stream)
            .with_max_audio_bytes(self.max_audio_bytes)
            .with_controller(ControllerConfig {
                default_time_limit: Duration::from_secs(self.default_time_limit),
            })
    }

    fn gemini_config(&self) -> GeminiConfig {
        let config = GeminiConfig::new(self.api_key.clone())
            .with_model(self.model.clone())
            .with_url_context(self.url_context);
        match &self.gemini_base_url {
            Some(base_url) => config.with_base_url(base_url.clone()),
            None => config,
        }
    }

    fn speech_config(&self) -> SpeechConfig {
        SpeechConfig::new(self.api_key.clone())
            .with_language_code(self.language_code.clone())
            .with_recognition_model(self.recognition_model.clone())
            .with_voice(self.voice.clone())
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    anyhow::ensure!(!cli.api_key.trim().is_empty(), "API_KEY must not be empty");
    anyhow::ensure!(cli.default_time_limit > 0, "default time limit must be positive");

    let client = reqwest::Client::builder()
        .build()
        .context("failed to build HTTP client")?;
    let completion = Arc::new(GeminiProvider::new(client.clone(), cli.gemini_config()));
    let speech = Arc::new(GoogleSpeechClient::new(client, cli.speech_config()));

    info!("Using model {} (url context: {})", cli.model, cli.url_context);
    start_server(cli.server_config(), completion, speech.clone(), speech).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let _log_guard = match init_logging(&cli.log_config()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("mockview: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("mockview: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "mockview",
            "--api-key",
            "k",
            "--port",
            "9000",
            "--stream",
            "false",
            "--default-time-limit",
            "900",
            "--log-format",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.port, 9000);
        assert!(!cli.stream);
        assert_eq!(cli.log_format, LogFormat::Json);

        let server = cli.server_config();
        assert!(server.address.ends_with(":9000"));
        assert!(!server.stream_by_default);
        assert_eq!(server.controller.default_time_limit, Duration::from_secs(900));
    }
}
