//! Error types for quiz-core.
//!
//! Parsing and validation never fail outright. Their problems are collected
//! as [`ParseIssue`] / [`ValidationIssue`] values and rendered into the
//! `errors` list of each result.

use std::fmt;

use thiserror::Error;

/// Result type alias using QuizError.
pub type Result<T> = std::result::Result<T, QuizError>;

/// Errors from decoding or encoding quiz JSON.
#[derive(Debug, Error)]
pub enum QuizError {
    #[error("Invalid JSON syntax: {0}")]
    Syntax(#[source] serde_json::Error),

    #[error("Invalid quiz structure: {0}")]
    Structure(#[source] serde_json::Error),

    #[error("Failed to encode quiz: {0}")]
    Encode(#[source] serde_json::Error),
}

/// How bad a parse issue is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Something was skipped or the document could not be used.
    Error,
    /// Content was kept after an automatic fix.
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => f.write_str("[Error]"),
            Self::Warning => f.write_str("[Warning]"),
        }
    }
}

/// Problems found while parsing quiz markdown.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseIssue {
    #[error("Expected module title (a '# <name>' heading)")]
    MissingModuleTitle,

    #[error("No valid chapters found")]
    NoValidChapters,

    #[error("Chapter '{chapter}' has no valid questions and was skipped")]
    EmptyChapter { chapter: String },

    #[error("Question found outside of a chapter and was skipped")]
    QuestionOutsideChapter,

    #[error("Unrecognized question heading '{heading}' (expected 'Q:' or 'T/F:')")]
    UnknownQuestionKind { heading: String },

    #[error("T/F questions cannot have an 'Options:' block")]
    TrueFalseWithOptions { question: String },

    #[error("Question '{question}' is missing an 'Options:' block")]
    MissingOptions { question: String },

    #[error("Question '{question}' needs at least 2 options, found {found}")]
    TooFewOptions { question: String, found: usize },

    #[error("Unparseable option line: '{text}'")]
    UnparseableOption { text: String },

    #[error("Option '{label}' has no text")]
    EmptyOption { label: String },

    #[error("Duplicate option label '{label}' in question '{question}'")]
    DuplicateOption { question: String, label: String },

    #[error("Question '{question}' is missing a correct answer ('**Correct:**' or '**Ans:**' line)")]
    MissingCorrectAnswer { question: String },

    #[error("Correct answer '{label}' does not match any option of question '{question}'")]
    UnknownCorrectOption { question: String, label: String },

    #[error("T/F answer must be 'True' or 'False', found '{value}'")]
    InvalidTrueFalseAnswer { value: String },

    #[error("Question '{question}' is missing an explanation ('**Exp:**' or '**Explanation:**' line)")]
    MissingExplanation { question: String },

    #[error("Duplicate chapter ID found: '{id}' ({chapter}) conflicts with '{first_chapter}' at line {first_line}; renamed to '{new_id}'")]
    DuplicateChapterId {
        id: String,
        chapter: String,
        first_chapter: String,
        first_line: usize,
        new_id: String,
    },

    #[error("Duplicate question ID found: '{id}' in chapter '{chapter}' conflicts with line {first_line} in chapter '{first_chapter}'; renamed to '{new_id}'")]
    DuplicateQuestionId {
        id: String,
        chapter: String,
        first_chapter: String,
        first_line: usize,
        new_id: String,
    },
}

impl ParseIssue {
    pub fn severity(&self) -> Severity {
        match self {
            Self::DuplicateChapterId { .. } | Self::DuplicateQuestionId { .. } => {
                Severity::Warning
            }
            _ => Severity::Error,
        }
    }
}

/// A parse issue anchored to a source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedIssue {
    pub line: Option<usize>,
    pub issue: ParseIssue,
}

impl fmt::Display for LocatedIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{} Line {}: {}", self.issue.severity(), line, self.issue),
            None => write!(f, "{} {}", self.issue.severity(), self.issue),
        }
    }
}

/// Schema violations found by the validator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationIssue {
    #[error("Invalid JSON syntax: {0}")]
    InvalidJson(String),

    #[error("Quiz module must be a JSON object")]
    RootNotObject,

    #[error("Module 'name' must be a non-empty string")]
    MissingModuleName,

    #[error("Module 'chapters' must be a non-empty array")]
    MissingChapters,

    #[error("{location}: must be an object")]
    NotAnObject { location: String },

    #[error("{location}: missing or empty '{field}'")]
    MissingField { location: String, field: &'static str },

    #[error("{location}: 'questions' must be a non-empty array")]
    EmptyQuestions { location: String },

    #[error("{location}: needs at least 2 options, found {found}")]
    TooFewOptions { location: String, found: usize },

    #[error("{location}: duplicate option ID '{option_id}'")]
    DuplicateOptionId { location: String, option_id: String },

    #[error("{location}: needs at least 1 correct option")]
    NoCorrectOption { location: String },

    #[error("{location}: correct option '{option_id}' is not one of its options")]
    UnknownCorrectOption { location: String, option_id: String },

    #[error("{location}: invalid {field} '{value}'")]
    InvalidEnumValue {
        location: String,
        field: &'static str,
        value: String,
    },

    #[error("Duplicate chapter ID found: '{id}' ({chapter}), first used by '{first_chapter}'")]
    DuplicateChapterId {
        id: String,
        chapter: String,
        first_chapter: String,
    },

    #[error("Duplicate question ID found: '{id}' in chapter '{chapter}', first used in chapter '{first_chapter}'")]
    DuplicateQuestionId {
        id: String,
        chapter: String,
        first_chapter: String,
    },
}

impl ValidationIssue {
    /// Duplicate IDs are repaired by the normalizer instead of rejected.
    pub fn is_auto_fixable(&self) -> bool {
        matches!(
            self,
            Self::DuplicateChapterId { .. } | Self::DuplicateQuestionId { .. }
        )
    }
}

/// Automatic repairs made by the normalizer. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeWarning {
    #[error("Duplicate chapter ID found: '{id}' ({chapter}), first used by '{first_chapter}'; renamed to '{new_id}'")]
    DuplicateChapterId {
        id: String,
        chapter: String,
        first_chapter: String,
        new_id: String,
    },

    #[error("Duplicate question ID found: '{id}' in chapter '{chapter}', first used in chapter '{first_chapter}'; renamed to '{new_id}'")]
    DuplicateQuestionId {
        id: String,
        chapter: String,
        first_chapter: String,
        new_id: String,
    },
}
