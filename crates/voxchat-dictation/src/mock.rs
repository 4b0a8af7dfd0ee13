//! In-memory host page and scripted recognition capability.
//!
//! `MockEditor` behaves like a paste-driven rich-text editor: a paste inserts
//! at the caret and leaves one zero-width placeholder node behind, which the
//! next collapsed delete removes instead of a character. `MockChatPage` wires
//! an editor and a send button together and, like the real chat, moves the
//! editor text into the sent-message list when the button is clicked.
//! `MockRecognition` hands out engines that only record start/stop calls; the
//! test or replay driver feeds events to the session itself.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use voxchat_core::error::{Result, VoxchatError};

use crate::recognition::{EngineId, EngineSettings, RecognitionCapability, RecognitionEngine};
use crate::surface::{
    EditCommand, EditorSurface, ElementLocator, KeyPress, PointerEvent, SubmitControl,
};

/// Default placeholder selector matched by [`MockEditor::count_matching`].
pub const PLACEHOLDER_SELECTOR: &str = "[data-slate-zero-width]";

// =============================================================================
// Editor
// =============================================================================

/// One interaction with a [`MockEditor`], in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorCall {
    Focus,
    CaretToEnd,
    Command(EditCommand),
    Paste(String),
    Key(KeyPress),
}

/// In-memory rich-text editor.
#[derive(Debug, Clone)]
pub struct MockEditor {
    content: Vec<char>,
    caret: usize,
    selection: Option<(usize, usize)>,
    placeholders: usize,
    editable: bool,
    accepts_paste: bool,
    focused: bool,
    commands: Vec<EditCommand>,
    keys: Vec<KeyPress>,
    pastes: Vec<String>,
    calls: Vec<EditorCall>,
}

impl Default for MockEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEditor {
    /// Empty, editable editor that accepts paste.
    pub fn new() -> Self {
        Self {
            content: Vec::new(),
            caret: 0,
            selection: None,
            placeholders: 0,
            editable: true,
            accepts_paste: true,
            focused: false,
            commands: Vec::new(),
            keys: Vec::new(),
            pastes: Vec::new(),
            calls: Vec::new(),
        }
    }

    /// Editor pre-filled with `text`, caret at the end.
    pub fn with_text(text: &str) -> Self {
        let mut editor = Self::new();
        editor.content = text.chars().collect();
        editor.caret = editor.content.len();
        editor
    }

    /// Ignore synthetic paste events, as an editor without a paste listener would.
    pub fn rejecting_paste(mut self) -> Self {
        self.accepts_paste = false;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.editable = false;
        self
    }

    pub fn set_caret(&mut self, caret: usize) {
        self.caret = caret.min(self.content.len());
        self.selection = None;
    }

    /// Drop all content, as the host does after a message is sent.
    pub fn clear(&mut self) {
        self.content.clear();
        self.caret = 0;
        self.selection = None;
        self.placeholders = 0;
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn command_log(&self) -> &[EditCommand] {
        &self.commands
    }

    pub fn key_log(&self) -> &[KeyPress] {
        &self.keys
    }

    pub fn paste_log(&self) -> &[String] {
        &self.pastes
    }

    /// Every focus, caret move, command, paste and key press, oldest first.
    pub fn call_log(&self) -> &[EditorCall] {
        &self.calls
    }

    fn delete_selection(&mut self) -> bool {
        match self.selection.take() {
            Some((start, end)) if start < end => {
                self.content.drain(start..end);
                self.caret = start;
                if self.content.is_empty() {
                    self.placeholders = 0;
                }
                true
            }
            _ => false,
        }
    }

    fn insert_at_caret(&mut self, text: &str) {
        self.delete_selection();
        for ch in text.chars() {
            self.content.insert(self.caret, ch);
            self.caret += 1;
        }
    }
}

impl EditorSurface for MockEditor {
    fn is_editable(&self) -> bool {
        self.editable
    }

    fn focus(&mut self) {
        self.calls.push(EditorCall::Focus);
        self.focused = true;
    }

    fn move_caret_to_end(&mut self) {
        self.calls.push(EditorCall::CaretToEnd);
        self.selection = None;
        self.caret = self.content.len();
    }

    fn exec_command(&mut self, command: &EditCommand) -> bool {
        if !self.editable {
            return false;
        }
        self.commands.push(command.clone());
        self.calls.push(EditorCall::Command(command.clone()));
        match command {
            EditCommand::SelectAll => {
                self.selection = Some((0, self.content.len()));
            }
            EditCommand::Delete => {
                if !self.delete_selection() {
                    if self.placeholders > 0 {
                        self.placeholders -= 1;
                    } else if self.caret > 0 {
                        self.caret -= 1;
                        self.content.remove(self.caret);
                    }
                }
            }
            EditCommand::InsertText(text) => self.insert_at_caret(text),
        }
        true
    }

    fn dispatch_paste(&mut self, payload: &str) {
        self.pastes.push(payload.to_string());
        self.calls.push(EditorCall::Paste(payload.to_string()));
        if !self.editable || !self.accepts_paste {
            return;
        }
        self.insert_at_caret(payload);
        self.placeholders += 1;
    }

    fn dispatch_key(&mut self, key: KeyPress) {
        self.keys.push(key);
        self.calls.push(EditorCall::Key(key));
    }

    fn visible_text(&self) -> String {
        self.content.iter().collect()
    }

    fn count_matching(&self, selector: &str) -> usize {
        if selector == PLACEHOLDER_SELECTOR {
            self.placeholders
        } else {
            0
        }
    }
}

// =============================================================================
// Submit button
// =============================================================================

/// In-memory send button.
#[derive(Debug, Clone, Default)]
pub struct MockSubmitButton {
    disabled: bool,
    attributes: HashMap<String, String>,
    events: Vec<PointerEvent>,
}

impl MockSubmitButton {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    pub fn set_attribute(&mut self, name: &str, value: &str) {
        self.attributes.insert(name.to_string(), value.to_string());
    }

    pub fn events(&self) -> &[PointerEvent] {
        &self.events
    }

    pub fn click_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| **e == PointerEvent::Click)
            .count()
    }
}

impl SubmitControl for MockSubmitButton {
    fn is_disabled(&self) -> bool {
        self.disabled
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.get(name).cloned()
    }

    fn dispatch_pointer(&mut self, event: PointerEvent) {
        self.events.push(event);
    }
}

// =============================================================================
// Page
// =============================================================================

/// A chat page with one editor and one send button.
///
/// Clicks are settled lazily: the next lookup or accessor moves the editor
/// text into [`MockChatPage::sent_messages`] and clears the editor.
#[derive(Debug, Clone)]
pub struct MockChatPage {
    editor: Option<MockEditor>,
    submit: Option<MockSubmitButton>,
    handled_clicks: usize,
    sent: Vec<String>,
}

impl Default for MockChatPage {
    fn default() -> Self {
        Self::new()
    }
}

impl MockChatPage {
    /// Page with a mounted, empty editor and an enabled send button.
    pub fn new() -> Self {
        Self::with_editor(MockEditor::new())
    }

    pub fn with_editor(editor: MockEditor) -> Self {
        Self {
            editor: Some(editor),
            submit: Some(MockSubmitButton::new()),
            handled_clicks: 0,
            sent: Vec::new(),
        }
    }

    pub fn unmount_editor(&mut self) {
        self.editor = None;
    }

    pub fn mount_editor(&mut self, editor: MockEditor) {
        self.editor = Some(editor);
    }

    pub fn unmount_submit(&mut self) {
        self.submit = None;
        self.handled_clicks = 0;
    }

    pub fn editor_mut(&mut self) -> Option<&mut MockEditor> {
        self.settle();
        self.editor.as_mut()
    }

    pub fn submit_mut(&mut self) -> Option<&mut MockSubmitButton> {
        self.settle();
        self.submit.as_mut()
    }

    /// Current visible editor text, `None` when unmounted.
    pub fn editor_text(&mut self) -> Option<String> {
        self.settle();
        self.editor.as_ref().map(|e| e.visible_text())
    }

    /// Messages the host page has "sent", oldest first.
    pub fn sent_messages(&mut self) -> &[String] {
        self.settle();
        &self.sent
    }

    /// Total clicks dispatched at the send button.
    pub fn submit_clicks(&self) -> usize {
        self.submit.as_ref().map_or(0, |s| s.click_count())
    }

    fn settle(&mut self) {
        let clicks = self.submit_clicks();
        while self.handled_clicks < clicks {
            self.handled_clicks += 1;
            if let Some(editor) = self.editor.as_mut() {
                let text = editor.visible_text().trim().to_string();
                if !text.is_empty() {
                    self.sent.push(text);
                }
                editor.clear();
            }
        }
    }
}

impl ElementLocator for MockChatPage {
    fn editor(&mut self, _selector: &str) -> Option<&mut dyn EditorSurface> {
        self.settle();
        self.editor.as_mut().map(|e| e as &mut dyn EditorSurface)
    }

    fn submit_control(&mut self, _selector: &str) -> Option<&mut dyn SubmitControl> {
        self.settle();
        self.submit.as_mut().map(|s| s as &mut dyn SubmitControl)
    }
}

// =============================================================================
// Recognition
// =============================================================================

/// A call made on a mock engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineCall {
    Started(EngineId),
    Stopped(EngineId),
}

#[derive(Debug, Default)]
struct RecognitionLog {
    created: Vec<(EngineId, EngineSettings)>,
    calls: Vec<EngineCall>,
}

/// Recognition capability whose engines record start/stop calls.
///
/// Clones share the same log, so a test can keep one clone for inspection
/// after moving the other into a session.
#[derive(Debug, Clone)]
pub struct MockRecognition {
    available: bool,
    fail_start: bool,
    fail_stop: bool,
    log: Rc<RefCell<RecognitionLog>>,
}

impl Default for MockRecognition {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRecognition {
    pub fn new() -> Self {
        Self {
            available: true,
            fail_start: false,
            fail_stop: false,
            log: Rc::new(RefCell::new(RecognitionLog::default())),
        }
    }

    /// A host environment without speech recognition.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    /// Engines refuse to start.
    pub fn failing_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    /// Engines report an error when stopped.
    pub fn failing_stop(mut self) -> Self {
        self.fail_stop = true;
        self
    }

    pub fn set_available(&mut self, available: bool) {
        self.available = available;
    }

    /// Ids of every engine created so far.
    pub fn created_ids(&self) -> Vec<EngineId> {
        self.log.borrow().created.iter().map(|(id, _)| *id).collect()
    }

    /// Settings passed to the most recent `create`.
    pub fn last_settings(&self) -> Option<EngineSettings> {
        self.log.borrow().created.last().map(|(_, s)| s.clone())
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.log.borrow().calls.clone()
    }
}

impl RecognitionCapability for MockRecognition {
    fn create(
        &mut self,
        id: EngineId,
        settings: &EngineSettings,
    ) -> Option<Box<dyn RecognitionEngine>> {
        if !self.available {
            return None;
        }
        self.log.borrow_mut().created.push((id, settings.clone()));
        Some(Box::new(MockEngine {
            id,
            fail_start: self.fail_start,
            fail_stop: self.fail_stop,
            log: Rc::clone(&self.log),
        }))
    }
}

struct MockEngine {
    id: EngineId,
    fail_start: bool,
    fail_stop: bool,
    log: Rc<RefCell<RecognitionLog>>,
}

impl RecognitionEngine for MockEngine {
    fn start(&mut self) -> Result<()> {
        if self.fail_start {
            return Err(VoxchatError::Recognition("not-allowed".to_string()));
        }
        self.log.borrow_mut().calls.push(EngineCall::Started(self.id));
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.log.borrow_mut().calls.push(EngineCall::Stopped(self.id));
        if self.fail_stop {
            return Err(VoxchatError::Recognition("invalid-state".to_string()));
        }
        Ok(())
    }
}
