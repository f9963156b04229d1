//! Session summary reports.
//!
//! Reports are reduced on demand from an immutable history slice; nothing is
//! maintained incrementally, so the same history and bounds always produce
//! the same report.

use chrono::{DateTime, Utc};
use focus_models::{Emotion, EmotionSample, SessionId, SessionReport};

/// Reduce a session history into a report.
///
/// Time is attributed to categories assuming samples are spread uniformly
/// across the session: `duration * count(category) / total`. An end before
/// the start counts as a zero-length session.
pub fn summarize(
    session_id: Option<SessionId>,
    history: &[EmotionSample],
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
) -> SessionReport {
    let duration_minutes = (end_time - start_time).num_milliseconds().max(0) as f64 / 60_000.0;
    let total = history.len();

    let average_attention = if total == 0 {
        0.0
    } else {
        history.iter().map(|s| s.attention).sum::<f64>() / total as f64
    };

    let minutes_in = |emotion: Emotion| -> f64 {
        if total == 0 {
            return 0.0;
        }
        let count = history.iter().filter(|s| s.emotion == emotion).count();
        duration_minutes * (count as f64 / total as f64)
    };

    SessionReport {
        session_id,
        start_time,
        end_time,
        duration_minutes,
        sample_count: total,
        average_attention,
        attentive_minutes: minutes_in(Emotion::Attentive),
        distracted_minutes: minutes_in(Emotion::Distracted),
        tired_minutes: minutes_in(Emotion::Tired),
        neutral_minutes: minutes_in(Emotion::Neutral),
    }
}
