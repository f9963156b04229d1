//! Emotion classification from attention scores.
//!
//! Checks run in a fixed order and the first match wins:
//!
//! | Condition | Emotion | Confidence |
//! |-----------|---------|------------|
//! | `a > attentive_above` | Attentive | `a` |
//! | `a < distracted_below` | Distracted | `1 - a` |
//! | `a < tired_below` | Tired | `tired_confidence` |
//! | otherwise | Neutral | `neutral_confidence` |

use chrono::{DateTime, Utc};
use focus_models::{Emotion, EmotionSample};

use crate::config::AttentionConfig;

/// Classifier output for one attention value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub emotion: Emotion,
    pub confidence: f64,
}

impl Classification {
    /// Turn the classification into a history sample.
    pub fn into_sample(self, attention: f64, sequence: u64, captured_at: DateTime<Utc>) -> EmotionSample {
        EmotionSample::new(self.emotion, self.confidence, attention, sequence, captured_at)
    }
}

/// Map an attention value onto exactly one emotion category.
pub fn classify(attention: f64, config: &AttentionConfig) -> Classification {
    if attention > config.attentive_above {
        Classification {
            emotion: Emotion::Attentive,
            confidence: attention,
        }
    } else if attention < config.distracted_below {
        Classification {
            emotion: Emotion::Distracted,
            confidence: 1.0 - attention,
        }
    } else if attention < config.tired_below {
        Classification {
            emotion: Emotion::Tired,
            confidence: config.tired_confidence,
        }
    } else {
        Classification {
            emotion: Emotion::Neutral,
            confidence: config.neutral_confidence,
        }
    }
}
