//! Voxchat dictation crate - speech to chat-editor pipeline.
//!
//! A [`RecordingSession`] consumes events from a host speech recognition
//! engine, normalizes spoken punctuation in finalized chunks, commits them
//! to a paste-driven rich-text chat editor and optionally presses the send
//! button. The host page is reached only through the capability traits in
//! [`surface`] and [`recognition`], so the whole pipeline runs against the
//! in-memory page in [`mock`] as well as a real one.

pub mod dispatch;
pub mod insert;
pub mod mock;
pub mod punctuation;
pub mod recognition;
pub mod session;
pub mod state;
pub mod surface;

pub use dispatch::DispatchTrigger;
pub use insert::{EditorInsertionProtocol, InsertionOutcome, InsertionReport, SkipReason};
pub use punctuation::PunctuationNormalizer;
pub use recognition::{
    EngineId, EngineSettings, Hypothesis, RecognitionCapability, RecognitionEngine,
    RecognitionError, RecognitionEvent, TranscriptResult,
};
pub use session::{RecordingSession, RunInfo};
pub use state::SessionState;
pub use surface::{EditCommand, EditorSurface, ElementLocator, KeyPress, PointerEvent, SubmitControl};
