//! Host page capabilities used by the insertion and submit procedures.
//!
//! The chat editor keeps its own document model and ignores direct value
//! writes, so everything here is expressed as the interactions a user would
//! produce: focus, logical edit commands, synthetic paste, key and pointer
//! events. Elements are re-queried through an [`ElementLocator`] on every call
//! because the host page may remount them at any time.

use std::fmt;

/// Logical editing commands understood by a rich-text surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditCommand {
    /// Select the whole editor content.
    SelectAll,
    /// Delete the selection, or one character before the caret.
    Delete,
    /// Insert text at the caret.
    InsertText(String),
}

/// Synthetic key press dispatched at a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPress {
    Space,
}

impl KeyPress {
    /// DOM `key` value.
    pub fn key(&self) -> &'static str {
        match self {
            KeyPress::Space => " ",
        }
    }

    /// DOM `code` value.
    pub fn code(&self) -> &'static str {
        match self {
            KeyPress::Space => "Space",
        }
    }
}

/// Pointer interaction dispatched at a control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    Down,
    Up,
    Click,
}

impl fmt::Display for PointerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointerEvent::Down => write!(f, "mousedown"),
            PointerEvent::Up => write!(f, "mouseup"),
            PointerEvent::Click => write!(f, "click"),
        }
    }
}

/// A rich-text editing surface that rejects direct value assignment.
pub trait EditorSurface {
    /// Whether the element currently accepts editing.
    fn is_editable(&self) -> bool;

    /// Give the surface input focus.
    fn focus(&mut self);

    /// Collapse the selection to the end of the existing content.
    fn move_caret_to_end(&mut self);

    /// Execute a logical edit command. Returns `false` if the surface refused it.
    fn exec_command(&mut self, command: &EditCommand) -> bool;

    /// Dispatch a synthetic clipboard paste carrying `text/plain` payload.
    fn dispatch_paste(&mut self, payload: &str);

    /// Dispatch a synthetic key press.
    fn dispatch_key(&mut self, key: KeyPress);

    /// The text a user currently sees in the surface.
    fn visible_text(&self) -> String;

    /// Number of descendants matching `selector` (used for placeholder nodes).
    fn count_matching(&self, selector: &str) -> usize;
}

/// A submit button exposing a disabled observable.
pub trait SubmitControl {
    /// The `disabled` property.
    fn is_disabled(&self) -> bool;

    /// Read an attribute value, e.g. `aria-disabled`.
    fn attribute(&self, name: &str) -> Option<String>;

    /// Dispatch a synthetic pointer interaction.
    fn dispatch_pointer(&mut self, event: PointerEvent);
}

/// Resolves attribute selectors to live host page elements.
pub trait ElementLocator {
    /// Look up the chat editor. `None` when it is not mounted.
    fn editor(&mut self, selector: &str) -> Option<&mut dyn EditorSurface>;

    /// Look up the submit control. `None` when it is not mounted.
    fn submit_control(&mut self, selector: &str) -> Option<&mut dyn SubmitControl>;
}
