//! Dialogue input events

/// Something that happened in a practice session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Begin (or restart) the practice dialogue
    Start,
    /// The user said or typed something
    UserResponse(String),
    /// The user asked for a hint on the current color
    HelpRequest,
    /// The user wants another attempt at the current color
    RetryRequest,
}

impl Event {
    /// Short name for logging
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::UserResponse(_) => "user_response",
            Self::HelpRequest => "help_request",
            Self::RetryRequest => "retry_request",
        }
    }
}

/// How a user utterance is understood
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    Yes,
    No,
    Unrecognized,
}

impl Reply {
    /// Classify already-normalized text
    ///
    /// Matching is exact: "yes." is accepted alongside "yes", "no." is not.
    #[must_use]
    pub fn classify(normalized: &str) -> Self {
        match normalized {
            "yes" | "yes." => Self::Yes,
            "no" => Self::No,
            _ => Self::Unrecognized,
        }
    }
}

/// Trim surrounding whitespace and lower-case
#[must_use]
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}
