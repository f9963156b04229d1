//! Emotion categories derived from attention scores.
//!
//! The categories are coarse labels attached to a heuristic attention value:
//!
//! - `Attentive`: focused and engaged
//! - `Distracted`: losing focus
//! - `Tired`: signs of fatigue
//! - `Neutral`: calm, neither engaged nor drifting

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Discrete emotion category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Emotion {
    Attentive,
    Distracted,
    Tired,
    Neutral,
}

impl Emotion {
    /// All emotion categories.
    pub const ALL: &'static [Emotion] = &[
        Emotion::Attentive,
        Emotion::Distracted,
        Emotion::Tired,
        Emotion::Neutral,
    ];

    /// Returns the category key as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Attentive => "attentive",
            Emotion::Distracted => "distracted",
            Emotion::Tired => "tired",
            Emotion::Neutral => "neutral",
        }
    }

    /// Returns the display label.
    pub fn label(&self) -> &'static str {
        match self {
            Emotion::Attentive => "Attentive",
            Emotion::Distracted => "Distracted",
            Emotion::Tired => "Tired",
            Emotion::Neutral => "Neutral",
        }
    }

    /// Returns the user-facing description.
    pub fn description(&self) -> &'static str {
        match self {
            Emotion::Attentive => "You appear to be focused and engaged with the content.",
            Emotion::Distracted => "You seem to be losing focus. Try to concentrate more.",
            Emotion::Tired => "You're showing signs of fatigue. Consider taking a short break.",
            Emotion::Neutral => "Your expression appears calm and balanced.",
        }
    }

    /// Returns the color tag used to badge this category.
    pub fn color_tag(&self) -> &'static str {
        match self {
            Emotion::Attentive => "green",
            Emotion::Distracted => "yellow",
            Emotion::Tired => "red",
            Emotion::Neutral => "gray",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Emotion {
    type Err = EmotionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "attentive" => Ok(Emotion::Attentive),
            "distracted" => Ok(Emotion::Distracted),
            "tired" => Ok(Emotion::Tired),
            "neutral" => Ok(Emotion::Neutral),
            _ => Err(EmotionParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown emotion: {0}")]
pub struct EmotionParseError(String);

/// One classified frame.
///
/// Samples are immutable once created and are only ever appended to a
/// session history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EmotionSample {
    pub emotion: Emotion,
    /// Classifier confidence in [0, 1]
    pub confidence: f64,
    /// Attention score the sample was classified from
    pub attention: f64,
    pub description: String,
    pub color_tag: String,
    /// Position in the monitor's history
    pub sequence: u64,
    pub captured_at: DateTime<Utc>,
}

impl EmotionSample {
    /// Build a sample, filling description and color from the category table.
    pub fn new(
        emotion: Emotion,
        confidence: f64,
        attention: f64,
        sequence: u64,
        captured_at: DateTime<Utc>,
    ) -> Self {
        Self {
            emotion,
            confidence,
            attention,
            description: emotion.description().to_string(),
            color_tag: emotion.color_tag().to_string(),
            sequence,
            captured_at,
        }
    }
}
