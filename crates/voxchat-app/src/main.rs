//! Voxchat binary - composition root.
//!
//! 1. Parse CLI arguments and load configuration from TOML
//! 2. Install the tracing subscriber
//! 3. Run the requested command:
//!    - `normalize`: print the punctuation-normalized transcript
//!    - `replay`: drive a recording session over the in-memory chat page with
//!      a script of recognition events and print what ended up in the chat

mod cli;

use std::path::Path;

use clap::Parser;
use tokio::sync::broadcast;

use voxchat_core::config::VoxchatConfig;
use voxchat_core::error::Result as VoxchatResult;
use voxchat_core::events::SessionEvent;
use voxchat_core::types::ListeningMode;
use voxchat_dictation::mock::{MockChatPage, MockRecognition};
use voxchat_dictation::{PunctuationNormalizer, RecognitionEvent, RecordingSession};

use cli::{CliArgs, Command};

/// Parse a JSON Lines script into recognition events. Blank lines and lines
/// starting with `#` are skipped.
fn read_script(path: &Path) -> Result<Vec<RecognitionEvent>, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    let mut events = Vec::new();
    for (lineno, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let event: RecognitionEvent = serde_json::from_str(line)
            .map_err(|e| format!("{}:{}: {}", path.display(), lineno + 1, e))?;
        events.push(event);
    }
    Ok(events)
}

/// Read the configuration file, keeping a parse failure as an error.
///
/// `Ok(None)` means there is no file at `path`. The caller reports the outcome
/// once tracing is installed.
fn load_config(path: &Path) -> VoxchatResult<Option<VoxchatConfig>> {
    if !path.exists() {
        return Ok(None);
    }
    VoxchatConfig::load(path).map(Some)
}

/// Log every status event until the session is dropped.
async fn status_listener(mut rx: broadcast::Receiver<SessionEvent>) {
    loop {
        match rx.recv().await {
            Ok(event) => {
                if let Some(status) = event.status_text() {
                    tracing::info!(status = %status, "Status");
                }
                if let Ok(json) = serde_json::to_string(&event) {
                    tracing::debug!(event = %json, "Session event");
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Status listener lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

fn run_normalize(config: &VoxchatConfig, text: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let normalizer = PunctuationNormalizer::from_config(config)?;
    println!("{}", normalizer.normalize(&text.join(" ")));
    Ok(())
}

async fn run_replay(
    mut config: VoxchatConfig,
    script: &Path,
    no_auto_send: bool,
    replace: bool,
    single_shot: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if single_shot {
        config.apply_mode(ListeningMode::SingleShot);
    }
    if no_auto_send {
        config.dictation.auto_send = false;
    }
    if replace {
        config.dictation.append_mode = false;
    }

    let events = read_script(script)?;
    tracing::info!(path = %script.display(), events = events.len(), "Replay script loaded");

    let mut session = RecordingSession::new(&config, MockRecognition::new(), MockChatPage::new())?;
    let listener = tokio::spawn(status_listener(session.subscribe()));

    for event in events {
        // The user presses the mic button again whenever the session went idle.
        if !session.is_listening() {
            session.activate()?;
        }
        if let Some(engine_id) = session.engine_id() {
            session.handle_event(engine_id, event);
        }
    }
    if session.is_listening() {
        session.deactivate()?;
    }

    let page = session.locator_mut();
    let editor_text = page.editor_text().unwrap_or_default();
    let sent = page.sent_messages().to_vec();
    drop(session);
    listener.await?;

    for message in &sent {
        println!("sent: {}", message);
    }
    println!("editor: {}", editor_text);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Read config before tracing, since the log level may come from the file.
    let config_file = args.resolve_config_path();
    let loaded = load_config(&config_file);
    let config = match &loaded {
        Ok(Some(config)) => config.clone(),
        _ => VoxchatConfig::default(),
    };
    let log_level = args.resolve_log_level(&config.general.log_level);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting voxchat v{}", env!("CARGO_PKG_VERSION"));
    match loaded {
        Ok(Some(_)) => {
            tracing::info!(path = %config_file.display(), lang = %config.recognition.lang, "Configuration loaded")
        }
        Ok(None) => {
            tracing::info!(path = %config_file.display(), "No configuration file, using defaults")
        }
        Err(e) => {
            tracing::warn!(path = %config_file.display(), error = %e, "Failed to load configuration, using defaults")
        }
    }

    match args.command {
        Command::Normalize { text } => run_normalize(&config, &text),
        Command::Replay {
            script,
            no_auto_send,
            replace,
            single_shot,
        } => run_replay(config, &script, no_auto_send, replace, single_shot).await,
    }
}
