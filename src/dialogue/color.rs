//! Practice colors and how they are drawn

use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A color whose sign can be practiced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Green,
    Red,
    Blue,
    Yellow,
}

impl Color {
    /// Every practicable color, in draw order
    pub const ALL: [Self; 4] = [Self::Green, Self::Red, Self::Blue, Self::Yellow];

    /// Lower-case name used in prompts and asset paths
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Red => "red",
            Self::Blue => "blue",
            Self::Yellow => "yellow",
        }
    }

    /// URL of the static video demonstrating this color's sign
    #[must_use]
    pub fn hint_video_url(self) -> String {
        format!("/videos/{}.mp4", self.as_str())
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::Validation(format!("unknown color: {s}")))
    }
}

/// Source of the next color to practice
pub trait ColorPicker: Send + Sync {
    /// Draw a color
    fn pick(&self) -> Color;
}

/// Uniform, independent draws from [`Color::ALL`]; repeats are allowed
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomColor;

impl ColorPicker for RandomColor {
    fn pick(&self) -> Color {
        Color::ALL
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(Color::Green)
    }
}

/// Always draws the same color
#[derive(Debug, Clone, Copy)]
pub struct FixedColor(pub Color);

impl ColorPicker for FixedColor {
    fn pick(&self) -> Color {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_and_video_urls() {
        assert_eq!(Color::Yellow.to_string(), "yellow");
        assert_eq!(Color::Blue.hint_video_url(), "/videos/blue.mp4");
    }

    #[test]
    fn test_parse() {
        assert_eq!(" Red ".parse::<Color>().unwrap(), Color::Red);
        assert!("purple".parse::<Color>().is_err());
    }

    #[test]
    fn test_random_draws_stay_in_set_and_cover_it() {
        let picker = RandomColor;
        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            let color = picker.pick();
            assert!(Color::ALL.contains(&color));
            seen.insert(color);
        }
        // 500 uniform draws missing a color has probability ~4 * 0.75^500
        assert_eq!(seen.len(), Color::ALL.len());
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Color::Green).unwrap(), "\"green\"");
    }
}
