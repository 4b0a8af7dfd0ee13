use thiserror::Error;

/// Top-level error type for the voxchat system.
///
/// Nothing in the dictation pipeline is fatal to the host page. These errors
/// are returned to the caller that drives the session (UI glue, the replay
/// binary) so it can show a status message and let the user try again.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VoxchatError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Speech recognition is not available for locale {locale}")]
    CapabilityUnavailable { locale: String },

    #[error("Recognition error: {0}")]
    Recognition(String),

    #[error("Target element not found: {selector}")]
    TargetMissing { selector: String },

    #[error("Invalid session transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Invalid punctuation cue: {0}")]
    Pattern(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for VoxchatError {
    fn from(err: toml::de::Error) -> Self {
        VoxchatError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for VoxchatError {
    fn from(err: toml::ser::Error) -> Self {
        VoxchatError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for VoxchatError {
    fn from(err: serde_json::Error) -> Self {
        VoxchatError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for voxchat operations.
pub type Result<T> = std::result::Result<T, VoxchatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = VoxchatError::Config("missing field".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing field");
    }

    #[test]
    fn test_error_display_structured_variants() {
        let cases: Vec<(VoxchatError, &str)> = vec![
            (
                VoxchatError::CapabilityUnavailable {
                    locale: "uk-UA".into(),
                },
                "Speech recognition is not available for locale uk-UA",
            ),
            (
                VoxchatError::TargetMissing {
                    selector: "[data-a-target=\"chat-input\"]".into(),
                },
                "Target element not found: [data-a-target=\"chat-input\"]",
            ),
            (
                VoxchatError::InvalidTransition {
                    from: "Listening".into(),
                    to: "Listening".into(),
                },
                "Invalid session transition: Listening -> Listening",
            ),
            (
                VoxchatError::Recognition("no-speech".into()),
                "Recognition error: no-speech",
            ),
            (
                VoxchatError::Pattern("unclosed group".into()),
                "Invalid punctuation cue: unclosed group",
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.to_string(), expected);
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: VoxchatError = io_err.into();
        assert!(matches!(err, VoxchatError::Io(_)));
        assert!(err.to_string().starts_with("I/O error:"));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_from_toml_de() {
        let err: std::result::Result<toml::Value, _> = toml::from_str("invalid = [[[");
        let err: VoxchatError = err.unwrap_err().into();
        assert!(matches!(err, VoxchatError::Config(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let err: std::result::Result<serde_json::Value, _> = serde_json::from_str("{ nope }");
        let err: VoxchatError = err.unwrap_err().into();
        assert!(matches!(err, VoxchatError::Serialization(_)));
    }

    #[test]
    fn test_result_type_with_question_mark() {
        fn inner() -> Result<String> {
            let io_result: std::result::Result<i32, std::io::Error> = Ok(42);
            let value = io_result?;
            Ok(value.to_string())
        }

        assert_eq!(inner().unwrap(), "42");
    }
}
