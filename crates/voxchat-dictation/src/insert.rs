//! Safe text insertion into the chat editor.
//!
//! The editor only keeps its internal document model in sync when content
//! arrives through paste semantics, so insertion is a fixed sequence of
//! synthetic interactions:
//!
//! 1. focus, then clear (replace) or move the caret to the end (append)
//! 2. dispatch a clipboard paste carrying the text
//! 3. if the paste produced no visible change, type the text one character at
//!    a time with `insertText`
//! 4. press space and delete, which makes the editor drop the zero-width
//!    placeholder node a paste can leave behind
//! 5. read back the visible text and placeholder count for diagnostics
//!
//! Steps 2 and 4 work around undocumented editor internals. Do not replace
//! them with a direct text write.

use tracing::{debug, warn};

use voxchat_core::config::PageConfig;
use voxchat_core::error::VoxchatError;
use voxchat_core::types::InsertMode;

use crate::surface::{EditCommand, EditorSurface, ElementLocator, KeyPress};

/// Why an insertion did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    EditorMissing,
    NotEditable,
    EmptyText,
}

/// How the text reached the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertionOutcome {
    /// The synthetic paste was accepted.
    Pasted,
    /// The paste was ignored and the text was typed character by character.
    TypedFallback,
    /// Nothing was touched.
    Skipped(SkipReason),
}

/// Result of one insertion, including the diagnostic readback.
///
/// Returned only after every synchronous step has run, so it doubles as the
/// completion signal callers wait on before submitting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertionReport {
    pub outcome: InsertionOutcome,
    /// Visible editor text after cleanup.
    pub visible_text: String,
    /// Zero-width placeholder nodes still present after cleanup.
    pub placeholder_nodes: usize,
}

impl InsertionReport {
    fn skipped(reason: SkipReason) -> Self {
        Self {
            outcome: InsertionOutcome::Skipped(reason),
            visible_text: String::new(),
            placeholder_nodes: 0,
        }
    }

    /// Whether the protocol ran to completion against a live editor.
    pub fn is_committed(&self) -> bool {
        !matches!(self.outcome, InsertionOutcome::Skipped(_))
    }

    /// Whether the character-by-character fallback was used.
    pub fn used_fallback(&self) -> bool {
        self.outcome == InsertionOutcome::TypedFallback
    }
}

/// Injects text into the chat editor through synthetic interactions.
#[derive(Debug, Clone)]
pub struct EditorInsertionProtocol {
    editor_selector: String,
    placeholder_selector: String,
}

impl EditorInsertionProtocol {
    pub fn new(editor_selector: impl Into<String>, placeholder_selector: impl Into<String>) -> Self {
        Self {
            editor_selector: editor_selector.into(),
            placeholder_selector: placeholder_selector.into(),
        }
    }

    pub fn from_page_config(page: &PageConfig) -> Self {
        Self::new(&page.editor_selector, &page.placeholder_selector)
    }

    /// Locate the editor and insert `text`.
    ///
    /// A missing or read-only editor is logged and skipped. The editor may
    /// simply not be mounted yet.
    pub fn insert(
        &self,
        locator: &mut dyn ElementLocator,
        text: &str,
        mode: InsertMode,
    ) -> InsertionReport {
        match locator.editor(&self.editor_selector) {
            Some(editor) => self.insert_into(editor, text, mode),
            None => {
                let err = VoxchatError::TargetMissing {
                    selector: self.editor_selector.clone(),
                };
                warn!(error = %err, "Insertion skipped");
                InsertionReport::skipped(SkipReason::EditorMissing)
            }
        }
    }

    /// Run the insertion sequence against an already located editor.
    pub fn insert_into(
        &self,
        editor: &mut dyn EditorSurface,
        text: &str,
        mode: InsertMode,
    ) -> InsertionReport {
        if !editor.is_editable() {
            warn!(selector = %self.editor_selector, "Chat editor is not editable, insertion skipped");
            return InsertionReport::skipped(SkipReason::NotEditable);
        }
        if text.is_empty() {
            return InsertionReport::skipped(SkipReason::EmptyText);
        }

        debug!(chars = text.chars().count(), %mode, "Inserting text");

        editor.focus();
        match mode {
            InsertMode::Replace => {
                editor.exec_command(&EditCommand::SelectAll);
                editor.exec_command(&EditCommand::Delete);
            }
            InsertMode::Append => editor.move_caret_to_end(),
        }

        let before = editor.visible_text();
        editor.dispatch_paste(text);

        let typed = if editor.visible_text() == before {
            warn!("Paste produced no visible change, typing text instead");
            for ch in text.chars() {
                editor.exec_command(&EditCommand::InsertText(ch.to_string()));
            }
            Some(editor.visible_text())
        } else {
            None
        };

        // Runs on both branches.
        editor.dispatch_key(KeyPress::Space);
        editor.exec_command(&EditCommand::Delete);

        let outcome = match typed {
            Some(typed) => {
                // Typed text leaves no placeholder, so the delete above took
                // the last typed character instead. Put it back.
                let after = editor.visible_text();
                if let Some(lost) = typed.strip_prefix(after.as_str()).filter(|l| !l.is_empty()) {
                    debug!(lost = %lost, "Restoring text removed by cleanup");
                    for ch in lost.chars() {
                        editor.exec_command(&EditCommand::InsertText(ch.to_string()));
                    }
                }
                InsertionOutcome::TypedFallback
            }
            None => InsertionOutcome::Pasted,
        };

        let visible_text = editor.visible_text();
        let placeholder_nodes = editor.count_matching(&self.placeholder_selector);
        debug!(
            ?outcome,
            visible_text = %visible_text,
            placeholders = placeholder_nodes,
            "Insertion readback"
        );
        if visible_text.trim().is_empty() {
            warn!("Editor is still empty after insertion");
        }

        InsertionReport {
            outcome,
            visible_text,
            placeholder_nodes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{EditorCall, MockChatPage, MockEditor};

    const EDITOR: &str = "[data-a-target=\"chat-input\"]";
    const PLACEHOLDER: &str = "[data-slate-zero-width]";

    fn protocol() -> EditorInsertionProtocol {
        EditorInsertionProtocol::new(EDITOR, PLACEHOLDER)
    }

    #[test]
    fn test_paste_path() {
        let mut editor = MockEditor::new();
        let report = protocol().insert_into(&mut editor, "hello", InsertMode::Append);

        assert_eq!(report.outcome, InsertionOutcome::Pasted);
        assert!(report.is_committed());
        assert!(!report.used_fallback());
        assert_eq!(report.visible_text, "hello");
        assert_eq!(report.placeholder_nodes, 0);
    }

    #[test]
    fn test_append_keeps_existing_content() {
        let mut editor = MockEditor::new();
        let p = protocol();
        p.insert_into(&mut editor, "a", InsertMode::Append);
        let report = p.insert_into(&mut editor, "b", InsertMode::Append);
        assert_eq!(report.visible_text, "ab");
    }

    #[test]
    fn test_replace_clears_existing_content() {
        let mut editor = MockEditor::new();
        let p = protocol();
        p.insert_into(&mut editor, "a", InsertMode::Replace);
        let report = p.insert_into(&mut editor, "b", InsertMode::Replace);
        assert_eq!(report.visible_text, "b");
    }

    #[test]
    fn test_append_moves_caret_to_end() {
        let mut editor = MockEditor::with_text("hello");
        editor.set_caret(0);
        let report = protocol().insert_into(&mut editor, " world", InsertMode::Append);
        assert_eq!(report.visible_text, "hello world");
    }

    #[test]
    fn test_fallback_when_paste_ignored() {
        let mut editor = MockEditor::new().rejecting_paste();
        let report = protocol().insert_into(&mut editor, "привіт ", InsertMode::Replace);

        assert_eq!(report.outcome, InsertionOutcome::TypedFallback);
        assert!(report.used_fallback());
        assert_eq!(report.visible_text, "привіт ");
        let typed: Vec<_> = editor
            .command_log()
            .iter()
            .filter_map(|c| match c {
                EditCommand::InsertText(t) => Some(t.as_str()),
                _ => None,
            })
            .collect();
        // The delimiter is typed again after the cleanup delete.
        assert_eq!(typed, vec!["п", "р", "и", "в", "і", "т", " ", " "]);
    }

    #[test]
    fn test_fallback_detected_with_prior_content() {
        let mut editor = MockEditor::with_text("keep ").rejecting_paste();
        let report = protocol().insert_into(&mut editor, "x ", InsertMode::Append);
        assert_eq!(report.outcome, InsertionOutcome::TypedFallback);
        assert_eq!(report.visible_text, "keep x ");
    }

    #[test]
    fn test_cleanup_runs_after_paste() {
        let mut editor = MockEditor::new();
        protocol().insert_into(&mut editor, "hi", InsertMode::Append);
        assert_eq!(editor.key_log(), &[KeyPress::Space]);
        assert_eq!(editor.command_log().last(), Some(&EditCommand::Delete));
    }

    #[test]
    fn test_cleanup_runs_after_fallback() {
        let mut editor = MockEditor::new().rejecting_paste();
        let report = protocol().insert_into(&mut editor, "hi", InsertMode::Append);
        assert_eq!(editor.key_log(), &[KeyPress::Space]);
        assert!(editor.command_log().contains(&EditCommand::Delete));
        assert_eq!(report.visible_text, "hi");
    }

    #[test]
    fn test_fallback_chunks_keep_their_delimiter() {
        let mut editor = MockEditor::new().rejecting_paste();
        let p = protocol();
        p.insert_into(&mut editor, "typed out ", InsertMode::Append);
        let report = p.insert_into(&mut editor, "more ", InsertMode::Append);
        assert_eq!(report.visible_text, "typed out more ");
    }

    #[test]
    fn test_focus_precedes_every_edit() {
        let mut editor = MockEditor::with_text("old");
        protocol().insert_into(&mut editor, "new", InsertMode::Replace);
        assert!(editor.is_focused());
        assert_eq!(
            &editor.call_log()[..2],
            &[EditorCall::Focus, EditorCall::Command(EditCommand::SelectAll)]
        );

        let mut editor = MockEditor::with_text("old");
        protocol().insert_into(&mut editor, "new", InsertMode::Append);
        assert!(editor.is_focused());
        assert_eq!(
            &editor.call_log()[..3],
            &[
                EditorCall::Focus,
                EditorCall::CaretToEnd,
                EditorCall::Paste("new".to_string())
            ]
        );
    }

    #[test]
    fn test_skipped_insertion_does_not_focus() {
        let mut editor = MockEditor::with_text("x").read_only();
        protocol().insert_into(&mut editor, "y", InsertMode::Append);
        assert!(!editor.is_focused());
        assert!(editor.call_log().is_empty());
    }

    #[test]
    fn test_replace_issues_select_all_and_delete_first() {
        let mut editor = MockEditor::with_text("old");
        protocol().insert_into(&mut editor, "new", InsertMode::Replace);
        assert_eq!(
            &editor.command_log()[..2],
            &[EditCommand::SelectAll, EditCommand::Delete]
        );
    }

    #[test]
    fn test_not_editable_is_skipped() {
        let mut editor = MockEditor::with_text("untouched").read_only();
        let report = protocol().insert_into(&mut editor, "x", InsertMode::Replace);
        assert_eq!(
            report.outcome,
            InsertionOutcome::Skipped(SkipReason::NotEditable)
        );
        assert!(!report.is_committed());
        assert_eq!(editor.visible_text(), "untouched");
        assert!(editor.command_log().is_empty());
    }

    #[test]
    fn test_missing_editor_is_skipped() {
        let mut page = MockChatPage::new();
        page.unmount_editor();
        let report = protocol().insert(&mut page, "x", InsertMode::Append);
        assert_eq!(
            report.outcome,
            InsertionOutcome::Skipped(SkipReason::EditorMissing)
        );
    }

    #[test]
    fn test_empty_text_is_skipped() {
        let mut editor = MockEditor::new();
        let report = protocol().insert_into(&mut editor, "", InsertMode::Append);
        assert_eq!(report.outcome, InsertionOutcome::Skipped(SkipReason::EmptyText));
        assert!(editor.command_log().is_empty());
    }

    #[test]
    fn test_insert_through_locator() {
        let mut page = MockChatPage::new();
        let report = protocol().insert(&mut page, "hey", InsertMode::Append);
        assert_eq!(report.outcome, InsertionOutcome::Pasted);
        assert_eq!(page.editor_text(), Some("hey".to_string()));
    }
}
