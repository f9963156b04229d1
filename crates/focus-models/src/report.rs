//! Session summary report.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{Emotion, SessionId};

/// Summary of one capture session, computed on demand from its history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SessionReport {
    pub session_id: Option<SessionId>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_minutes: f64,
    pub sample_count: usize,
    /// Arithmetic mean of per-sample attention (0 when there are no samples)
    pub average_attention: f64,
    pub attentive_minutes: f64,
    pub distracted_minutes: f64,
    pub tired_minutes: f64,
    pub neutral_minutes: f64,
}

impl SessionReport {
    /// Minutes attributed to a single category.
    pub fn minutes_for(&self, emotion: Emotion) -> f64 {
        match emotion {
            Emotion::Attentive => self.attentive_minutes,
            Emotion::Distracted => self.distracted_minutes,
            Emotion::Tired => self.tired_minutes,
            Emotion::Neutral => self.neutral_minutes,
        }
    }
}
