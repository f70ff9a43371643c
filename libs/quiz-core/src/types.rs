//! Core types for the quiz model.
//!
//! The JSON form of these types is the wire format collaborators exchange:
//! camelCase field names, `nextReviewAt` always present (`null` when unset).

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::algorithm::clamp_srs_level;

/// Question learning status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionStatus {
    NotAttempted,
    Attempted,
    PassedOnce,
    Mastered,
}

impl Default for QuestionStatus {
    fn default() -> Self {
        Self::NotAttempted
    }
}

impl QuestionStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [QuestionStatus; 4] = [
        Self::NotAttempted,
        Self::Attempted,
        Self::PassedOnce,
        Self::Mastered,
    ];

    /// Get the status name as it appears in JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotAttempted => "not_attempted",
            Self::Attempted => "attempted",
            Self::PassedOnce => "passed_once",
            Self::Mastered => "mastered",
        }
    }

    /// Parse from the JSON name.
    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == s)
    }
}

/// Question kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Mcq,
    TrueFalse,
}

impl Default for QuestionType {
    fn default() -> Self {
        Self::Mcq
    }
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mcq => "mcq",
            Self::TrueFalse => "true_false",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "mcq" => Some(Self::Mcq),
            "true_false" => Some(Self::TrueFalse),
            _ => None,
        }
    }
}

/// One answer option. Unique by `option_id` within its question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizOption {
    pub option_id: String,
    pub option_text: String,
}

impl QuizOption {
    pub fn new(option_id: impl Into<String>, option_text: impl Into<String>) -> Self {
        Self {
            option_id: option_id.into(),
            option_text: option_text.into(),
        }
    }
}

/// A question together with its review state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub question_id: String,
    pub question_text: String,
    pub options: Vec<QuizOption>,
    pub correct_option_ids: Vec<String>,
    pub explanation_text: String,
    #[serde(rename = "type", default, deserialize_with = "lenient::or_default")]
    pub question_type: QuestionType,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub status: QuestionStatus,
    #[serde(default, deserialize_with = "lenient::count")]
    pub times_answered_correctly: u32,
    #[serde(default, deserialize_with = "lenient::count")]
    pub times_answered_incorrectly: u32,
    #[serde(default, deserialize_with = "lenient::srs_level")]
    pub srs_level: u8,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub next_review_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub shown_incorrect_option_ids: Vec<String>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub history_of_incorrect_selections: Vec<String>,
    #[serde(
        default,
        deserialize_with = "lenient::or_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_selected_option_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_attempted_at: Option<DateTime<Utc>>,
}

impl Question {
    /// Create an unanswered question.
    pub fn new(
        question_id: impl Into<String>,
        question_text: impl Into<String>,
        options: Vec<QuizOption>,
        correct_option_ids: Vec<String>,
        explanation_text: impl Into<String>,
        question_type: QuestionType,
    ) -> Self {
        Self {
            question_id: question_id.into(),
            question_text: question_text.into(),
            options,
            correct_option_ids,
            explanation_text: explanation_text.into(),
            question_type,
            status: QuestionStatus::NotAttempted,
            times_answered_correctly: 0,
            times_answered_incorrectly: 0,
            srs_level: 0,
            next_review_at: None,
            shown_incorrect_option_ids: Vec::new(),
            history_of_incorrect_selections: Vec::new(),
            last_selected_option_id: None,
            last_attempted_at: None,
        }
    }

    /// Snapshot of the fields the scheduler reads and writes.
    pub fn review_state(&self) -> ReviewState {
        ReviewState {
            status: self.status,
            srs_level: self.srs_level,
            next_review_at: self.next_review_at,
            times_answered_correctly: self.times_answered_correctly,
            times_answered_incorrectly: self.times_answered_incorrectly,
        }
    }

    /// Return a copy of this question carrying `state`.
    pub fn with_review_state(&self, state: ReviewState) -> Self {
        Self {
            status: state.status,
            srs_level: state.srs_level,
            next_review_at: state.next_review_at,
            times_answered_correctly: state.times_answered_correctly,
            times_answered_incorrectly: state.times_answered_incorrectly,
            ..self.clone()
        }
    }

    pub fn has_option(&self, option_id: &str) -> bool {
        self.options.iter().any(|o| o.option_id == option_id)
    }
}

/// A chapter. Aggregate counters are derived from question state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub id: String,
    pub name: String,
    #[serde(
        default,
        deserialize_with = "lenient::or_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
    pub questions: Vec<Question>,
    #[serde(default, deserialize_with = "lenient::count_usize")]
    pub total_questions: usize,
    #[serde(default, deserialize_with = "lenient::count_usize")]
    pub answered_questions: usize,
    #[serde(default, deserialize_with = "lenient::count_usize")]
    pub correct_answers: usize,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub is_completed: bool,
}

impl Chapter {
    /// Create a chapter with counters computed from `questions`.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: Option<String>,
        questions: Vec<Question>,
    ) -> Self {
        let mut chapter = Self {
            id: id.into(),
            name: name.into(),
            description,
            questions,
            total_questions: 0,
            answered_questions: 0,
            correct_answers: 0,
            is_completed: false,
        };
        chapter.recompute_counters();
        chapter
    }

    /// Recompute the aggregate counters from per-question state.
    ///
    /// Answered means any status other than `not_attempted`; correct means at
    /// least one correct attempt was recorded. A chapter is completed once
    /// every question has been answered.
    pub fn recompute_counters(&mut self) {
        self.total_questions = self.questions.len();
        self.answered_questions = self
            .questions
            .iter()
            .filter(|q| q.status != QuestionStatus::NotAttempted)
            .count();
        self.correct_answers = self
            .questions
            .iter()
            .filter(|q| q.times_answered_correctly > 0)
            .count();
        self.is_completed =
            self.total_questions > 0 && self.answered_questions == self.total_questions;
    }
}

/// The top-level quiz document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizModule {
    pub name: String,
    #[serde(
        default,
        deserialize_with = "lenient::or_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
    pub chapters: Vec<Chapter>,
}

impl QuizModule {
    /// Iterate over every question in document order.
    pub fn questions(&self) -> impl Iterator<Item = &Question> {
        self.chapters.iter().flat_map(|c| c.questions.iter())
    }

    pub fn find_question(&self, question_id: &str) -> Option<&Question> {
        self.questions().find(|q| q.question_id == question_id)
    }

    pub fn question_count(&self) -> usize {
        self.chapters.iter().map(|c| c.questions.len()).sum()
    }
}

/// Review state of a single question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewState {
    pub status: QuestionStatus,
    pub srs_level: u8,
    pub next_review_at: Option<DateTime<Utc>>,
    pub times_answered_correctly: u32,
    pub times_answered_incorrectly: u32,
}

impl Default for ReviewState {
    fn default() -> Self {
        Self {
            status: QuestionStatus::NotAttempted,
            srs_level: 0,
            next_review_at: None,
            times_answered_correctly: 0,
            times_answered_incorrectly: 0,
        }
    }
}

/// Decoders for untrusted review and counter fields.
///
/// A value of the wrong type, `null` included, decodes as the field's
/// default instead of failing the whole document.
mod lenient {
    use serde::de::IgnoredAny;

    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Loose<T> {
        Value(T),
        Other(IgnoredAny),
    }

    impl<T> Loose<T> {
        fn into_option(self) -> Option<T> {
            match self {
                Self::Value(value) => Some(value),
                Self::Other(_) => None,
            }
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawTimestamp {
        Millis(f64),
        Text(String),
    }

    pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de> + Default,
    {
        Ok(Loose::<T>::deserialize(deserializer)?
            .into_option()
            .unwrap_or_default())
    }

    pub fn srs_level<'de, D>(deserializer: D) -> Result<u8, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Loose::<f64>::deserialize(deserializer)?.into_option();
        Ok(raw.map(clamp_srs_level).unwrap_or(0))
    }

    pub fn count<'de, D>(deserializer: D) -> Result<u32, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Loose::<f64>::deserialize(deserializer)?.into_option();
        Ok(raw.map(to_count).unwrap_or(0).min(u32::MAX as u64) as u32)
    }

    pub fn count_usize<'de, D>(deserializer: D) -> Result<usize, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Loose::<f64>::deserialize(deserializer)?.into_option();
        Ok(raw.map(to_count).unwrap_or(0) as usize)
    }

    /// Unparseable timestamps decode as unset, which makes the question due.
    pub fn timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Loose::<RawTimestamp>::deserialize(deserializer)?.into_option();
        Ok(match raw {
            Some(RawTimestamp::Millis(ms)) if ms.is_finite() => {
                Utc.timestamp_millis_opt(ms as i64).single()
            }
            Some(RawTimestamp::Text(text)) => DateTime::parse_from_rfc3339(&text)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            _ => None,
        })
    }

    fn to_count(value: f64) -> u64 {
        if value.is_finite() && value > 0.0 {
            value.floor() as u64
        } else {
            0
        }
    }
}
