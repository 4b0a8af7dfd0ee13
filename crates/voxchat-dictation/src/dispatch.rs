//! Synthetic submit of the chat message.
//!
//! The host may bind its send handler to the full pointer gesture rather than
//! to a generic activation, so a submit is mousedown, mouseup, click in that
//! order. The control's own enabled state is the gate; it is never modified.

use tracing::{debug, info, warn};

use voxchat_core::config::PageConfig;
use voxchat_core::error::VoxchatError;

use crate::surface::{ElementLocator, PointerEvent, SubmitControl};

const GESTURE: [PointerEvent; 3] = [PointerEvent::Down, PointerEvent::Up, PointerEvent::Click];

/// Presses the chat send button.
#[derive(Debug, Clone)]
pub struct DispatchTrigger {
    submit_selector: String,
}

impl DispatchTrigger {
    pub fn new(submit_selector: impl Into<String>) -> Self {
        Self {
            submit_selector: submit_selector.into(),
        }
    }

    pub fn from_page_config(page: &PageConfig) -> Self {
        Self::new(&page.submit_selector)
    }

    /// Locate the send button and press it if enabled.
    ///
    /// Returns whether a submit attempt was made.
    pub fn submit(&self, locator: &mut dyn ElementLocator) -> bool {
        match locator.submit_control(&self.submit_selector) {
            Some(control) => Self::press(control),
            None => {
                let err = VoxchatError::TargetMissing {
                    selector: self.submit_selector.clone(),
                };
                warn!(error = %err, "Submit skipped");
                false
            }
        }
    }

    /// Press an already located control if it reports itself enabled.
    pub fn press(control: &mut dyn SubmitControl) -> bool {
        if !is_enabled(control) {
            debug!("Send button disabled, submit skipped");
            return false;
        }

        info!("Sending message");
        for event in GESTURE {
            control.dispatch_pointer(event);
        }
        true
    }
}

/// Enabled means neither the `disabled` property nor `aria-disabled="true"`.
pub fn is_enabled(control: &dyn SubmitControl) -> bool {
    !control.is_disabled() && control.attribute("aria-disabled").as_deref() != Some("true")
}
