use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Wall-clock timestamp attached to session events.
pub type Timestamp = DateTime<Utc>;

// =============================================================================
// Enums
// =============================================================================

/// How dictated text is committed into the chat editor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertMode {
    /// Keep existing editor content and insert after it (default).
    #[default]
    Append,
    /// Clear the editor before inserting.
    Replace,
}

impl InsertMode {
    /// Map the session's `append_mode` flag onto an insert mode.
    pub fn from_append_flag(append: bool) -> Self {
        if append {
            InsertMode::Append
        } else {
            InsertMode::Replace
        }
    }
}

impl fmt::Display for InsertMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsertMode::Append => write!(f, "append"),
            InsertMode::Replace => write!(f, "replace"),
        }
    }
}

/// Recognition preset.
///
/// `Continuous` keeps one engine running across pauses, appends every finalized
/// chunk and restarts the engine when it ends on its own. `SingleShot` is the
/// legacy behavior: one utterance per engine, replace-on-insert, no restart.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListeningMode {
    #[default]
    Continuous,
    SingleShot,
}

/// What a spoken cue turns into.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CueKind {
    /// A punctuation mark that attaches to the preceding word ("comma" -> ",").
    #[default]
    Mark,
    /// A line break that swallows the whitespace around it ("new line" -> "\n").
    Break,
}

// =============================================================================
// Value types
// =============================================================================

/// One entry of the spoken-cue table used by the punctuation normalizer.
///
/// Table order is match order: a longer phrase that shares a prefix with a
/// shorter one must be listed first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpokenCue {
    /// The spoken phrase, matched case-insensitively on word boundaries.
    pub phrase: String,
    /// The literal text that replaces the phrase.
    pub replacement: String,
    #[serde(default)]
    pub kind: CueKind,
}

impl SpokenCue {
    pub fn mark(phrase: &str, replacement: &str) -> Self {
        Self {
            phrase: phrase.to_string(),
            replacement: replacement.to_string(),
            kind: CueKind::Mark,
        }
    }

    pub fn line_break(phrase: &str, replacement: &str) -> Self {
        Self {
            phrase: phrase.to_string(),
            replacement: replacement.to_string(),
            kind: CueKind::Break,
        }
    }
}
