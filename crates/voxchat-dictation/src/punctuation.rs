//! Spoken punctuation normalization.
//!
//! Rewrites spoken cues ("comma", "new line") into literal punctuation and
//! capitalizes the first letter after a sentence terminator. The cue table is
//! data, not code: it comes from the config or from a built-in table keyed by
//! the recognition locale.

use regex::{NoExpand, Regex};

use voxchat_core::config::VoxchatConfig;
use voxchat_core::error::{Result, VoxchatError};
use voxchat_core::types::{CueKind, SpokenCue};

/// A compiled cue pattern with its replacement.
struct CueRule {
    regex: Regex,
    replacement: String,
}

/// Converts spoken punctuation cues into literal punctuation.
///
/// Pure and deterministic. Applying it to its own output changes nothing,
/// because no cue phrase survives the first pass and capitalization is stable.
pub struct PunctuationNormalizer {
    rules: Vec<CueRule>,
    sentence_start: Option<Regex>,
}

impl std::fmt::Debug for PunctuationNormalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PunctuationNormalizer")
            .field("rules", &self.rules.len())
            .field("case_correction", &self.sentence_start.is_some())
            .finish()
    }
}

impl PunctuationNormalizer {
    /// Compile a normalizer from a cue table. Earlier entries win.
    pub fn new(cues: &[SpokenCue]) -> Result<Self> {
        let mut rules = Vec::with_capacity(cues.len());
        for cue in cues {
            let phrase = cue.phrase.trim();
            if phrase.is_empty() {
                return Err(VoxchatError::Pattern("empty cue phrase".to_string()));
            }
            // Words inside a phrase never match across a line break.
            let words: Vec<String> = phrase.split_whitespace().map(regex::escape).collect();
            let body = words.join(r"[ \t]+");
            let pattern = match cue.kind {
                CueKind::Mark => format!(r"(?i)\s*\b{}\b", body),
                CueKind::Break => format!(r"(?i)[ \t]*\b{}\b[ \t]*", body),
            };
            let regex = Regex::new(&pattern)
                .map_err(|e| VoxchatError::Pattern(format!("{}: {}", cue.phrase, e)))?;
            rules.push(CueRule {
                regex,
                replacement: cue.replacement.clone(),
            });
        }

        let sentence_start = Regex::new(r"([.!?])(\s*)(\p{L})")
            .map_err(|e| VoxchatError::Pattern(e.to_string()))?;

        Ok(Self {
            rules,
            sentence_start: Some(sentence_start),
        })
    }

    /// Normalizer that returns its input untouched.
    pub fn passthrough() -> Self {
        Self {
            rules: Vec::new(),
            sentence_start: None,
        }
    }

    /// Built-in table for the given locale tag (e.g. "uk-UA", "en-US").
    ///
    /// Unknown languages fall back to the English table.
    pub fn for_locale(lang: &str) -> Self {
        let cues = builtin_cues(lang);
        match Self::new(&cues) {
            Ok(normalizer) => normalizer,
            Err(e) => {
                tracing::error!(lang, error = %e, "Built-in cue table failed to compile");
                Self::passthrough()
            }
        }
    }

    /// Build the normalizer described by the configuration.
    pub fn from_config(config: &VoxchatConfig) -> Result<Self> {
        if !config.punctuation.enabled {
            return Ok(Self::passthrough());
        }
        match &config.punctuation.cues {
            Some(cues) => Self::new(cues),
            None => Ok(Self::for_locale(&config.recognition.lang)),
        }
    }

    /// Number of cue rules in this normalizer.
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Rewrite spoken cues and fix sentence case.
    pub fn normalize(&self, raw: &str) -> String {
        if raw.is_empty() {
            return String::new();
        }

        let mut text = raw.to_string();
        for rule in &self.rules {
            text = rule
                .regex
                .replace_all(&text, NoExpand(&rule.replacement))
                .into_owned();
        }

        if let Some(ref sentence_start) = self.sentence_start {
            text = sentence_start
                .replace_all(&text, |caps: &regex::Captures| {
                    format!("{}{}{}", &caps[1], &caps[2], caps[3].to_uppercase())
                })
                .into_owned();
        }

        text
    }
}

/// Built-in cue table for a locale tag, matched on its language subtag.
pub fn builtin_cues(lang: &str) -> Vec<SpokenCue> {
    let language = lang
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();

    match language.as_str() {
        "uk" => vec![
            SpokenCue::mark("знак питання", "?"),
            SpokenCue::mark("знак оклику", "!"),
            // Must precede both "кома" and "крапка".
            SpokenCue::mark("крапка з комою", ";"),
            SpokenCue::mark("двокрапка", ":"),
            SpokenCue::mark("кома", ","),
            SpokenCue::mark("крапка", "."),
            SpokenCue::line_break("новий рядок", "\n"),
            SpokenCue::line_break("абзац", "\n\n"),
        ],
        _ => vec![
            SpokenCue::mark("question mark", "?"),
            SpokenCue::mark("exclamation mark", "!"),
            SpokenCue::mark("exclamation point", "!"),
            SpokenCue::mark("semicolon", ";"),
            SpokenCue::mark("colon", ":"),
            SpokenCue::mark("comma", ","),
            SpokenCue::mark("full stop", "."),
            SpokenCue::mark("period", "."),
            SpokenCue::line_break("new line", "\n"),
            SpokenCue::line_break("paragraph", "\n\n"),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn english() -> PunctuationNormalizer {
        PunctuationNormalizer::for_locale("en-US")
    }

    #[test]
    fn test_cue_replacement() {
        assert_eq!(english().normalize("hello comma world period"), "hello, world.");
    }

    #[test]
    fn test_case_correction() {
        assert_eq!(english().normalize("done. next"), "done. Next");
        assert_eq!(english().normalize("what? yes! ok"), "what? Yes! Ok");
    }

    #[test]
    fn test_case_correction_without_whitespace() {
        assert_eq!(english().normalize("done.next"), "done.Next");
    }

    #[test]
    fn test_cues_are_case_insensitive() {
        assert_eq!(
            english().normalize("really Question Mark yes PERIOD"),
            "really? Yes."
        );
    }

    #[test]
    fn test_cue_then_capitalize() {
        assert_eq!(
            english().normalize("stop period go exclamation mark now"),
            "stop. Go! Now"
        );
    }

    #[test]
    fn test_semicolon_not_shadowed_by_colon() {
        assert_eq!(english().normalize("a semicolon b colon c"), "a; b: c");
    }

    #[test]
    fn test_whole_word_only() {
        // "periodic" and "commander" must not be touched.
        assert_eq!(
            english().normalize("periodic commander"),
            "periodic commander"
        );
    }

    #[test]
    fn test_line_breaks() {
        assert_eq!(english().normalize("one new line two"), "one\ntwo");
        assert_eq!(english().normalize("one paragraph two"), "one\n\ntwo");
    }

    #[test]
    fn test_sentence_case_after_break() {
        assert_eq!(
            english().normalize("end period new line start"),
            "end.\nStart"
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(english().normalize(""), "");
    }

    #[test]
    fn test_idempotent_on_literal_punctuation() {
        let n = english();
        for s in [
            "hello, world.",
            "done. Next",
            "a; b: c? d! e",
            "one\ntwo\n\nthree. four",
            "",
            "no punctuation at all",
        ] {
            let once = n.normalize(s);
            assert_eq!(n.normalize(&once), once, "not idempotent for {:?}", s);
        }
    }

    #[test]
    fn test_idempotent_after_cue_pass() {
        let n = english();
        let once = n.normalize("hi comma there period how are you question mark");
        assert_eq!(once, "hi, there. How are you?");
        assert_eq!(n.normalize(&once), once);
    }

    #[test]
    fn test_cue_words_do_not_join_across_lines() {
        let n = english();
        let once = n.normalize("new new line line");
        assert_eq!(once, "new\nline");
        assert_eq!(n.normalize(&once), once);
        assert_eq!(n.normalize("question\nmark"), "question\nmark");
    }

    #[test]
    fn test_ukrainian_table_order() {
        let n = PunctuationNormalizer::for_locale("uk-UA");
        assert_eq!(n.normalize("так крапка з комою ні"), "так; ні");
        assert_eq!(n.normalize("привіт кома світ крапка"), "привіт, світ.");
        assert_eq!(n.normalize("увага двокрапка тест"), "увага: тест");
    }

    #[test]
    fn test_ukrainian_capitalization() {
        let n = PunctuationNormalizer::for_locale("uk-UA");
        assert_eq!(n.normalize("добре крапка далі"), "добре. Далі");
        assert_eq!(n.normalize("що знак питання так"), "що? Так");
    }

    #[test]
    fn test_unknown_locale_uses_english() {
        let n = PunctuationNormalizer::for_locale("xx");
        assert_eq!(n.normalize("a comma b"), "a, b");
    }

    #[test]
    fn test_custom_table() {
        let n = PunctuationNormalizer::new(&[
            SpokenCue::mark("full stop", "."),
            SpokenCue::line_break("next line", "\n"),
        ])
        .unwrap();
        assert_eq!(n.rule_count(), 2);
        assert_eq!(n.normalize("one full stop two next line x"), "one. Two\nx");
        // "comma" is not in this table.
        assert_eq!(n.normalize("a comma b"), "a comma b");
    }

    #[test]
    fn test_replacement_is_literal() {
        let n = PunctuationNormalizer::new(&[SpokenCue::mark("dollar", "$1")]).unwrap();
        assert_eq!(n.normalize("five dollar"), "five$1");
    }

    #[test]
    fn test_empty_phrase_is_rejected() {
        let result = PunctuationNormalizer::new(&[SpokenCue::mark("  ", ",")]);
        assert!(matches!(result, Err(VoxchatError::Pattern(_))));
    }

    #[test]
    fn test_passthrough() {
        let n = PunctuationNormalizer::passthrough();
        assert_eq!(n.normalize("hello comma world. next"), "hello comma world. next");
    }

    #[test]
    fn test_from_config() {
        let mut config = VoxchatConfig::default();
        config.recognition.lang = "en-GB".to_string();
        let n = PunctuationNormalizer::from_config(&config).unwrap();
        assert_eq!(n.normalize("a comma b"), "a, b");

        config.punctuation.enabled = false;
        let n = PunctuationNormalizer::from_config(&config).unwrap();
        assert_eq!(n.normalize("a comma b"), "a comma b");

        config.punctuation.enabled = true;
        config.punctuation.cues = Some(vec![SpokenCue::mark("dot", ".")]);
        let n = PunctuationNormalizer::from_config(&config).unwrap();
        assert_eq!(n.normalize("a dot b"), "a. B");
    }
}
