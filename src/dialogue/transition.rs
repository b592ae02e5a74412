//! Pure dialogue transitions
//!
//! `transition` never performs I/O. The caller commits the returned state
//! and carries out the effects (speaking the prompt, showing the hint).

use super::color::{Color, ColorPicker};
use super::event::{Event, Reply, normalize};
use super::state::{DialogueState, Phase};
use crate::{Error, Result};

pub const START_PROMPT: &str = "Would you like to practice colors today?";
pub const DECLINE_PROMPT: &str = "Okay, let me know when you're ready to practice!";
pub const CLARIFY_PROMPT: &str =
    "I'm sorry, I didn't quite understand that. Would you like to practice colors today?";

/// Side effects requested by a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// A new color was drawn for practice
    ColorAssigned(Color),
    /// Show the hint video for a color
    ShowHint { color: Color, video_url: String },
}

/// Outcome of applying one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// State to commit
    pub state: DialogueState,
    /// Text to speak back to the user
    pub prompt: String,
    pub effects: Vec<Effect>,
}

impl Transition {
    /// Hint video URL, when the transition shows one
    #[must_use]
    pub fn hint_video_url(&self) -> Option<&str> {
        self.effects.iter().find_map(|e| match e {
            Effect::ShowHint { video_url, .. } => Some(video_url.as_str()),
            Effect::ColorAssigned(_) => None,
        })
    }
}

/// Compute the next state, prompt and effects for `event`
///
/// # Errors
///
/// Returns [`Error::NoActiveColor`] for help or retry requests while no
/// color is assigned
pub fn transition(
    state: &DialogueState,
    event: Event,
    picker: &dyn ColorPicker,
) -> Result<Transition> {
    let mut next = state.clone();
    let mut effects = Vec::new();

    let prompt = match event {
        Event::Start => {
            next.phase = Phase::AwaitingConfirmation;
            START_PROMPT.to_string()
        }
        Event::UserResponse(text) => {
            let normalized = normalize(&text);
            let reply = Reply::classify(&normalized);
            next.record_response(normalized);

            match reply {
                Reply::Yes => {
                    let color = next.set_random_color(picker);
                    next.phase = Phase::Practicing;
                    effects.push(Effect::ColorAssigned(color));
                    format!(
                        "Great! Let's start with the color {color}. Can you show me the sign for {color}?"
                    )
                }
                Reply::No => {
                    next.phase = Phase::Idle;
                    DECLINE_PROMPT.to_string()
                }
                Reply::Unrecognized => {
                    next.phase = Phase::AwaitingConfirmation;
                    CLARIFY_PROMPT.to_string()
                }
            }
        }
        Event::HelpRequest => {
            let color = state.get_current_color().ok_or(Error::NoActiveColor)?;
            next.mark_help_requested();
            next.phase = Phase::HintGiven;
            effects.push(Effect::ShowHint {
                color,
                video_url: color.hint_video_url(),
            });
            format!("No worries! Here's a hint. Watch the video showing the sign for {color}.")
        }
        Event::RetryRequest => {
            let color = state.get_current_color().ok_or(Error::NoActiveColor)?;
            format!("Now, give it another try! Show me the sign for {color}!")
        }
    };

    Ok(Transition {
        state: next,
        prompt,
        effects,
    })
}
