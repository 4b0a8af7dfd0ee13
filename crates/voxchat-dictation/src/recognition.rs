//! Speech recognition capability and its event stream.
//!
//! Recognition itself is delegated to the host environment. The session only
//! needs to create an engine, start and stop it, and consume the events it
//! delivers. Every engine gets an [`EngineId`] so events from a released
//! engine can be told apart from the current one.

use serde::{Deserialize, Serialize};

use voxchat_core::config::RecognitionConfig;
use voxchat_core::error::Result;

/// Generation number of an engine instance within one session.
pub type EngineId = u64;

/// Settings handed to the capability when an engine is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    /// Locale tag, e.g. "uk-UA".
    pub lang: String,
    pub continuous: bool,
    pub interim_results: bool,
}

impl From<&RecognitionConfig> for EngineSettings {
    fn from(config: &RecognitionConfig) -> Self {
        Self {
            lang: config.lang.clone(),
            continuous: config.continuous,
            interim_results: config.interim_results,
        }
    }
}

/// One recognition hypothesis (the best alternative of a result slot).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hypothesis {
    pub transcript: String,
    #[serde(default)]
    pub is_final: bool,
}

impl Hypothesis {
    pub fn final_text(transcript: &str) -> Self {
        Self {
            transcript: transcript.to_string(),
            is_final: true,
        }
    }

    pub fn interim(transcript: &str) -> Self {
        Self {
            transcript: transcript.to_string(),
            is_final: false,
        }
    }
}

/// All hypotheses accumulated since the engine started.
///
/// Entries before `result_index` were delivered in an earlier event and must
/// not be processed again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptResult {
    #[serde(default)]
    pub result_index: usize,
    pub results: Vec<Hypothesis>,
}

impl TranscriptResult {
    pub fn new(result_index: usize, results: Vec<Hypothesis>) -> Self {
        Self {
            result_index,
            results,
        }
    }

    /// Hypotheses not seen in any previous event.
    pub fn new_entries(&self) -> &[Hypothesis] {
        self.results.get(self.result_index..).unwrap_or(&[])
    }
}

/// Error reported by a running engine ("no-speech", "audio-capture", ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognitionError {
    pub code: String,
    #[serde(default)]
    pub message: String,
}

impl RecognitionError {
    pub fn new(code: &str) -> Self {
        Self {
            code: code.to_string(),
            message: String::new(),
        }
    }
}

/// Notifications delivered by an engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecognitionEvent {
    Result(TranscriptResult),
    /// The engine stopped producing results.
    End,
    Error(RecognitionError),
}

/// Handle to one live recognition engine.
pub trait RecognitionEngine {
    /// Begin capturing audio.
    fn start(&mut self) -> Result<()>;

    /// Ask the engine to stop. Callers discard the handle regardless of the result.
    fn stop(&mut self) -> Result<()>;
}

/// Host-provided factory for recognition engines.
pub trait RecognitionCapability {
    /// Create an engine, or `None` if recognition is not available.
    ///
    /// The engine must tag every event it delivers with `id`.
    fn create(
        &mut self,
        id: EngineId,
        settings: &EngineSettings,
    ) -> Option<Box<dyn RecognitionEngine>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entries_skips_consumed() {
        let result = TranscriptResult::new(
            1,
            vec![
                Hypothesis::final_text("hello"),
                Hypothesis::interim("wor"),
            ],
        );
        assert_eq!(result.new_entries(), &[Hypothesis::interim("wor")]);
    }

    #[test]
    fn test_new_entries_out_of_range_is_empty() {
        let result = TranscriptResult::new(5, vec![Hypothesis::final_text("x")]);
        assert!(result.new_entries().is_empty());
    }

    #[test]
    fn test_engine_settings_from_config() {
        let config = RecognitionConfig::default();
        let settings = EngineSettings::from(&config);
        assert_eq!(settings.lang, "uk-UA");
        assert!(settings.continuous);
        assert!(settings.interim_results);
    }

    #[test]
    fn test_event_json_shapes() {
        let event: RecognitionEvent = serde_json::from_str(
            r#"{"result": {"result_index": 0, "results": [{"transcript": "hi", "is_final": true}]}}"#,
        )
        .unwrap();
        assert_eq!(
            event,
            RecognitionEvent::Result(TranscriptResult::new(
                0,
                vec![Hypothesis::final_text("hi")]
            ))
        );

        let end: RecognitionEvent = serde_json::from_str(r#""end""#).unwrap();
        assert_eq!(end, RecognitionEvent::End);

        let error: RecognitionEvent =
            serde_json::from_str(r#"{"error": {"code": "no-speech"}}"#).unwrap();
        assert_eq!(error, RecognitionEvent::Error(RecognitionError::new("no-speech")));
    }

    #[test]
    fn test_hypothesis_is_final_defaults_to_false() {
        let h: Hypothesis = serde_json::from_str(r#"{"transcript": "par"}"#).unwrap();
        assert!(!h.is_final);
    }
}
