//! Spaced repetition scheduling.
//!
//! A three-rung ladder: level 0 (new or just failed), level 1 (passed once,
//! re-asked after a short learning interval) and level 2 (mastered, never
//! re-asked). Any wrong answer drops the question back to level 0.

use chrono::{DateTime, Duration, Utc};

use crate::types::{QuestionStatus, ReviewState};

/// Highest SRS level a question can reach.
pub const MAX_SRS_LEVEL: u8 = 2;

/// Delay before a failed question comes back.
pub const FAILED_INTERVAL_MS: i64 = 30_000;

/// Delay before a question passed once comes back.
pub const LEARNING_INTERVAL_MS: i64 = 600_000;

/// Mastered questions are not rescheduled.
pub const MASTERED_INTERVAL_MS: i64 = 0;

/// Clamp an untrusted level into `0..=MAX_SRS_LEVEL`.
///
/// NaN maps to 0 and positive infinity to the maximum.
pub fn clamp_srs_level(level: f64) -> u8 {
    if level.is_nan() || level <= 0.0 {
        0
    } else if level >= MAX_SRS_LEVEL as f64 {
        MAX_SRS_LEVEL
    } else {
        level.floor() as u8
    }
}

/// Calculate the review state after an answer.
pub fn calculate_next_review(
    state: &ReviewState,
    was_correct: bool,
    now: DateTime<Utc>,
) -> ReviewState {
    let level = clamp_srs_level(state.srs_level as f64);

    if was_correct {
        let new_level = (level + 1).min(MAX_SRS_LEVEL);
        let (status, next_review_at) = if new_level >= MAX_SRS_LEVEL {
            (QuestionStatus::Mastered, None)
        } else {
            (
                QuestionStatus::PassedOnce,
                Some(now + Duration::milliseconds(LEARNING_INTERVAL_MS)),
            )
        };

        ReviewState {
            status,
            srs_level: new_level,
            next_review_at,
            times_answered_correctly: state.times_answered_correctly.saturating_add(1),
            times_answered_incorrectly: state.times_answered_incorrectly,
        }
    } else {
        ReviewState {
            status: QuestionStatus::Attempted,
            srs_level: 0,
            next_review_at: Some(now + Duration::milliseconds(FAILED_INTERVAL_MS)),
            times_answered_correctly: state.times_answered_correctly,
            times_answered_incorrectly: state.times_answered_incorrectly.saturating_add(1),
        }
    }
}

/// [`calculate_next_review`] against the wall clock.
pub fn calculate_next_review_now(state: &ReviewState, was_correct: bool) -> ReviewState {
    calculate_next_review(state, was_correct, Utc::now())
}

/// Whether a question in `state` belongs in the review queue at `now`.
pub fn is_due(state: &ReviewState, now: DateTime<Utc>) -> bool {
    if state.status == QuestionStatus::Mastered {
        return false;
    }
    match state.next_review_at {
        None => true,
        Some(at) => at <= now,
    }
}
