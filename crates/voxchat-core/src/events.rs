use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{InsertMode, Timestamp};

/// Status events published by a recording session.
///
/// Consumed by the UI glue that owns the record button and status label, and
/// by the replay binary for its transcript log.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum SessionEvent {
    /// The session acquired a recognition engine and is listening.
    Started {
        session_id: Uuid,
        engine_id: u64,
        timestamp: Timestamp,
    },

    /// A non-final hypothesis arrived. Only shown as a "listening..." hint.
    Interim { session_id: Uuid, text: String },

    /// A finalized chunk was committed to the chat editor.
    Inserted {
        session_id: Uuid,
        chars: usize,
        mode: InsertMode,
        used_fallback: bool,
        timestamp: Timestamp,
    },

    /// A synthetic submit gesture was dispatched at the send control.
    Submitted { session_id: Uuid, timestamp: Timestamp },

    /// Auto-send was on but the send control was missing or disabled.
    SubmitSkipped { session_id: Uuid },

    /// The engine ended on its own and a replacement was acquired.
    Restarted {
        session_id: Uuid,
        engine_id: u64,
        timestamp: Timestamp,
    },

    /// The session returned to idle.
    Stopped { session_id: Uuid, timestamp: Timestamp },

    /// The engine reported an error; the session is back to idle.
    RecognitionFailed { session_id: Uuid, code: String },

    /// No recognition capability exists in the host environment.
    CapabilityUnavailable { locale: String },

    /// One of the mode toggles changed.
    ModeChanged { auto_send: bool, append_mode: bool },
}

impl SessionEvent {
    /// Short status-label text for the UI, if the event warrants one.
    pub fn status_text(&self) -> Option<String> {
        match self {
            SessionEvent::Started { .. } => Some("Listening...".to_string()),
            SessionEvent::Interim { text, .. } => Some(format!("Listening... {}", text)),
            SessionEvent::CapabilityUnavailable { .. } => {
                Some("Speech recognition unavailable".to_string())
            }
            SessionEvent::RecognitionFailed { code, .. } => {
                Some(format!("Recognition stopped: {}", code))
            }
            SessionEvent::ModeChanged { auto_send, .. } => Some(if *auto_send {
                "Mode: insert + send".to_string()
            } else {
                "Mode: insert only".to_string()
            }),
            SessionEvent::Stopped { .. } => Some(String::new()),
            _ => None,
        }
    }
}
