//! Recording session driving recognition, normalization, insertion and submit.
//!
//! A `RecordingSession` owns at most one live recognition engine. The host
//! feeds it engine events through [`RecordingSession::handle_event`]; finalized
//! transcript chunks are normalized, committed to the chat editor and, with
//! auto-send on, submitted. An engine that ends by itself while the session is
//! still listening is replaced (auto-restart); an engine error returns the
//! session to idle and the user has to activate again.

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use voxchat_core::config::VoxchatConfig;
use voxchat_core::error::{Result, VoxchatError};
use voxchat_core::events::SessionEvent;
use voxchat_core::types::InsertMode;

use crate::dispatch::DispatchTrigger;
use crate::insert::{EditorInsertionProtocol, InsertionReport};
use crate::punctuation::PunctuationNormalizer;
use crate::recognition::{
    EngineId, EngineSettings, RecognitionCapability, RecognitionEngine, RecognitionError,
    RecognitionEvent, TranscriptResult,
};
use crate::state::{SessionState, StateMachine};
use crate::surface::ElementLocator;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// The engine-owning part of a session, present only while listening.
struct ActiveRun {
    id: Uuid,
    started_at: DateTime<Utc>,
    engine_id: EngineId,
    engine: Box<dyn RecognitionEngine>,
    restarts: u32,
    chunks_inserted: u32,
}

/// Snapshot of the active run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunInfo {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub engine_id: EngineId,
    pub restarts: u32,
    pub chunks_inserted: u32,
}

/// Voice capture session bound to one chat page.
pub struct RecordingSession<C, L> {
    state: StateMachine,
    run: Option<ActiveRun>,
    capability: C,
    locator: L,
    settings: EngineSettings,
    auto_restart: bool,
    auto_send: bool,
    append_mode: bool,
    delimiter: String,
    normalizer: PunctuationNormalizer,
    inserter: EditorInsertionProtocol,
    trigger: DispatchTrigger,
    next_engine_id: EngineId,
    events: broadcast::Sender<SessionEvent>,
}

impl<C, L> std::fmt::Debug for RecordingSession<C, L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingSession")
            .field("state", &self.state.current())
            .field("engine_id", &self.run.as_ref().map(|r| r.engine_id))
            .field("auto_send", &self.auto_send)
            .field("append_mode", &self.append_mode)
            .field("settings", &self.settings)
            .finish()
    }
}

impl<C, L> RecordingSession<C, L>
where
    C: RecognitionCapability,
    L: ElementLocator,
{
    /// Build an idle session from the configuration.
    ///
    /// Fails only if a configured punctuation cue does not compile.
    pub fn new(config: &VoxchatConfig, capability: C, locator: L) -> Result<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Self {
            state: StateMachine::new(),
            run: None,
            capability,
            locator,
            settings: EngineSettings::from(&config.recognition),
            auto_restart: config.recognition.auto_restart,
            auto_send: config.dictation.auto_send,
            append_mode: config.dictation.append_mode,
            delimiter: config.dictation.delimiter.clone(),
            normalizer: PunctuationNormalizer::from_config(config)?,
            inserter: EditorInsertionProtocol::from_page_config(&config.page),
            trigger: DispatchTrigger::from_page_config(&config.page),
            next_engine_id: 0,
            events,
        })
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn state(&self) -> SessionState {
        self.state.current()
    }

    pub fn is_listening(&self) -> bool {
        self.state.current() == SessionState::Listening
    }

    /// Id of the live engine, if any. Events must carry this id to be accepted.
    pub fn engine_id(&self) -> Option<EngineId> {
        self.run.as_ref().map(|r| r.engine_id)
    }

    pub fn current_run(&self) -> Option<RunInfo> {
        self.run.as_ref().map(|r| RunInfo {
            id: r.id,
            started_at: r.started_at,
            engine_id: r.engine_id,
            restarts: r.restarts,
            chunks_inserted: r.chunks_inserted,
        })
    }

    pub fn auto_send(&self) -> bool {
        self.auto_send
    }

    pub fn append_mode(&self) -> bool {
        self.append_mode
    }

    /// Subscribe to status events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn locator_mut(&mut self) -> &mut L {
        &mut self.locator
    }

    pub fn capability_mut(&mut self) -> &mut C {
        &mut self.capability
    }

    // -------------------------------------------------------------------------
    // Mode toggles
    // -------------------------------------------------------------------------

    /// Takes effect on the next finalized chunk.
    pub fn set_auto_send(&mut self, auto_send: bool) {
        self.auto_send = auto_send;
        self.publish_mode();
    }

    /// Takes effect on the next finalized chunk.
    pub fn set_append_mode(&mut self, append_mode: bool) {
        self.append_mode = append_mode;
        self.publish_mode();
    }

    fn publish_mode(&self) {
        info!(auto_send = self.auto_send, append_mode = self.append_mode, "Dictation mode changed");
        self.publish(SessionEvent::ModeChanged {
            auto_send: self.auto_send,
            append_mode: self.append_mode,
        });
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Start listening. Only valid from `Idle`.
    ///
    /// Returns `CapabilityUnavailable` when the host has no recognition
    /// engine, or `Recognition` when the engine refuses to start. The session
    /// stays idle in both cases.
    pub fn activate(&mut self) -> Result<()> {
        if self.state.current() != SessionState::Idle {
            return Err(VoxchatError::InvalidTransition {
                from: self.state.current().to_string(),
                to: SessionState::Listening.to_string(),
            });
        }

        let (engine_id, engine) = match self.spawn_engine() {
            Ok(spawned) => spawned,
            Err(e) => {
                if let VoxchatError::CapabilityUnavailable { ref locale } = e {
                    self.publish(SessionEvent::CapabilityUnavailable {
                        locale: locale.clone(),
                    });
                }
                return Err(e);
            }
        };

        self.state.transition(SessionState::Listening)?;
        let run = ActiveRun {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            engine_id,
            engine,
            restarts: 0,
            chunks_inserted: 0,
        };
        info!(
            session_id = %run.id,
            engine_id,
            lang = %self.settings.lang,
            continuous = self.settings.continuous,
            "Recording session started"
        );
        self.publish(SessionEvent::Started {
            session_id: run.id,
            engine_id,
            timestamp: run.started_at,
        });
        self.run = Some(run);
        Ok(())
    }

    /// Stop listening. Only valid from `Listening`.
    pub fn deactivate(&mut self) -> Result<()> {
        if self.state.current() != SessionState::Listening {
            return Err(VoxchatError::InvalidTransition {
                from: self.state.current().to_string(),
                to: SessionState::Stopping.to_string(),
            });
        }
        self.teardown();
        Ok(())
    }

    /// Activate when idle, deactivate when listening.
    pub fn toggle(&mut self) -> Result<()> {
        match self.state.current() {
            SessionState::Idle => self.activate(),
            SessionState::Listening => self.deactivate(),
            // Teardown never yields while Stopping.
            SessionState::Stopping => Ok(()),
        }
    }

    /// Consume one event from the engine identified by `engine_id`.
    ///
    /// Events from a released engine, or arriving while not listening, are
    /// dropped.
    pub fn handle_event(&mut self, engine_id: EngineId, event: RecognitionEvent) {
        if !self.is_listening() || self.engine_id() != Some(engine_id) {
            debug!(engine_id, state = %self.state.current(), "Ignoring stale recognition event");
            return;
        }

        match event {
            RecognitionEvent::Result(result) => self.on_result(&result),
            RecognitionEvent::End => self.on_end(),
            RecognitionEvent::Error(err) => self.on_error(err),
        }
    }

    fn on_result(&mut self, result: &TranscriptResult) {
        let mut finals: Vec<&str> = Vec::new();
        let mut interim: Option<&str> = None;

        for hypothesis in result.new_entries() {
            let text = hypothesis.transcript.trim();
            if text.is_empty() {
                continue;
            }
            if hypothesis.is_final {
                finals.push(text);
            } else {
                interim = Some(text);
            }
        }

        let session_id = self.run.as_ref().map(|r| r.id).unwrap_or_default();
        if let Some(text) = interim {
            self.publish(SessionEvent::Interim {
                session_id,
                text: text.to_string(),
            });
        }

        if finals.is_empty() {
            return;
        }
        let raw = finals.join(" ");
        self.commit(&raw);
    }

    /// Normalize a finalized chunk, insert it and optionally submit.
    fn commit(&mut self, raw: &str) -> InsertionReport {
        let mut text = self.normalizer.normalize(raw);
        text.push_str(&self.delimiter);
        let mode = InsertMode::from_append_flag(self.append_mode);

        let report = self.inserter.insert(&mut self.locator, &text, mode);
        if !report.is_committed() {
            return report;
        }

        let session_id = match self.run.as_mut() {
            Some(run) => {
                run.chunks_inserted += 1;
                run.id
            }
            None => Uuid::nil(),
        };
        self.publish(SessionEvent::Inserted {
            session_id,
            chars: text.chars().count(),
            mode,
            used_fallback: report.used_fallback(),
            timestamp: Utc::now(),
        });

        // The report is only returned once every insertion step has run, so
        // the submit below always observes the committed text.
        if self.auto_send {
            if self.trigger.submit(&mut self.locator) {
                self.publish(SessionEvent::Submitted {
                    session_id,
                    timestamp: Utc::now(),
                });
            } else {
                self.publish(SessionEvent::SubmitSkipped { session_id });
            }
        }

        report
    }

    fn on_end(&mut self) {
        if !self.auto_restart {
            info!("Recognition engine ended");
            self.teardown();
            return;
        }

        match self.spawn_engine() {
            Ok((engine_id, engine)) => {
                if let Some(run) = self.run.as_mut() {
                    // The old engine already ended on its own; just drop it.
                    run.engine = engine;
                    run.engine_id = engine_id;
                    run.restarts += 1;
                    info!(
                        session_id = %run.id,
                        engine_id,
                        restarts = run.restarts,
                        "Recognition engine ended unexpectedly, restarted"
                    );
                    let event = SessionEvent::Restarted {
                        session_id: run.id,
                        engine_id,
                        timestamp: Utc::now(),
                    };
                    self.publish(event);
                }
            }
            Err(e) => {
                warn!(error = %e, "Recognition restart failed");
                if let VoxchatError::CapabilityUnavailable { ref locale } = e {
                    self.publish(SessionEvent::CapabilityUnavailable {
                        locale: locale.clone(),
                    });
                }
                self.teardown();
            }
        }
    }

    fn on_error(&mut self, err: RecognitionError) {
        warn!(code = %err.code, message = %err.message, "Speech recognition error");
        let session_id = self.run.as_ref().map(|r| r.id).unwrap_or_default();
        self.publish(SessionEvent::RecognitionFailed {
            session_id,
            code: err.code,
        });
        self.teardown();
    }

    /// Create and start a new engine with the next id.
    fn spawn_engine(&mut self) -> Result<(EngineId, Box<dyn RecognitionEngine>)> {
        let engine_id = self.next_engine_id;
        self.next_engine_id += 1;

        let mut engine = match self.capability.create(engine_id, &self.settings) {
            Some(engine) => engine,
            None => {
                warn!(lang = %self.settings.lang, "Speech recognition not available");
                return Err(VoxchatError::CapabilityUnavailable {
                    locale: self.settings.lang.clone(),
                });
            }
        };

        if let Err(e) = engine.start() {
            error!(engine_id, error = %e, "Cannot start recognition");
            let _ = engine.stop();
            return Err(match e {
                VoxchatError::Recognition(msg) => VoxchatError::Recognition(msg),
                other => VoxchatError::Recognition(other.to_string()),
            });
        }

        Ok((engine_id, engine))
    }

    /// Release the engine and return to idle. Stop errors are ignored.
    fn teardown(&mut self) {
        if let Err(e) = self.state.transition(SessionState::Stopping) {
            warn!(error = %e, "Unexpected state during teardown");
        }

        let session_id = match self.run.take() {
            Some(mut run) => {
                if let Err(e) = run.engine.stop() {
                    debug!(engine_id = run.engine_id, error = %e, "Engine stop failed, discarding");
                }
                let elapsed = Utc::now() - run.started_at;
                info!(
                    session_id = %run.id,
                    chunks = run.chunks_inserted,
                    restarts = run.restarts,
                    elapsed_secs = elapsed.num_milliseconds() as f64 / 1000.0,
                    "Recording session stopped"
                );
                run.id
            }
            None => Uuid::nil(),
        };

        if self.state.transition(SessionState::Idle).is_err() {
            self.state.reset();
        }
        self.publish(SessionEvent::Stopped {
            session_id,
            timestamp: Utc::now(),
        });
    }

    fn publish(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}
