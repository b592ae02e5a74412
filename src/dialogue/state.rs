//! Per-session dialogue state

use serde::Serialize;

use super::color::{Color, ColorPicker};

/// Where the dialogue currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No prompt outstanding
    #[default]
    Idle,
    /// Asked whether the user wants to practice
    AwaitingConfirmation,
    /// A color is assigned and awaits a sign
    Practicing,
    /// A hint was shown for the current color
    HintGiven,
}

/// State held for one practice session
///
/// `help_requested` only carries meaning while `current_color` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogueState {
    pub phase: Phase,
    pub current_color: Option<Color>,
    pub last_response: Option<String>,
    pub help_requested: bool,
}

impl DialogueState {
    /// Fresh state: idle, no color, no hint
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The color being practiced, if any
    #[must_use]
    pub const fn get_current_color(&self) -> Option<Color> {
        self.current_color
    }

    /// Draw and assign a new color, clearing any earlier hint request
    pub fn set_random_color(&mut self, picker: &dyn ColorPicker) -> Color {
        let color = picker.pick();
        self.current_color = Some(color);
        self.help_requested = false;
        color
    }

    /// Remember the latest utterance
    pub fn record_response(&mut self, text: impl Into<String>) {
        self.last_response = Some(text.into());
    }

    /// Flag that a hint was shown for the current color
    pub const fn mark_help_requested(&mut self) {
        self.help_requested = true;
    }
}
