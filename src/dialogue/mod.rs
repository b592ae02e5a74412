//! Color-practice dialogue
//!
//! The dialogue is an explicit state machine: a [`DialogueState`] per
//! session and a pure [`transition`] function mapping an [`Event`] to the
//! next state, the prompt to speak, and any [`Effect`]s.

mod color;
mod event;
mod state;
mod transition;

pub use color::{Color, ColorPicker, FixedColor, RandomColor};
pub use event::{Event, Reply, normalize};
pub use state::{DialogueState, Phase};
pub use transition::{
    CLARIFY_PROMPT, DECLINE_PROMPT, Effect, START_PROMPT, Transition, transition,
};
