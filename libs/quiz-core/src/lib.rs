//! Core quiz library shared by the CLI and any other front end.
//!
//! Provides:
//! - Markdown parser for quiz modules
//! - JSON schema validation and normalization (duplicate ID auto-fix)
//! - Spaced repetition scheduling and quiz session helpers
//! - LaTeX repair for JSON-mangled math
//! - Shared types (QuizModule, Chapter, Question, ReviewState, etc.)

pub mod algorithm;
pub mod dedup;
pub mod error;
pub mod import;
pub mod latex;
pub mod normalize;
pub mod parser;
pub mod session;
pub mod types;
pub mod validator;

pub use algorithm::{
    calculate_next_review, calculate_next_review_now, clamp_srs_level, FAILED_INTERVAL_MS,
    LEARNING_INTERVAL_MS, MASTERED_INTERVAL_MS, MAX_SRS_LEVEL,
};
pub use error::{
    LocatedIssue, NormalizeWarning, ParseIssue, QuizError, Result, Severity, ValidationIssue,
};
pub use import::{detect_format, from_json, import_quiz, to_json, ImportResult, SourceFormat};
pub use latex::{correct_latex, correct_module_latex};
pub use normalize::{normalize, Normalized};
pub use parser::{has_errors, parse_markdown, ParseResult};
pub use session::{
    answer_question, due_questions, is_due, record_answer, reset_progress, ChapterStats,
    ModuleStats, ProgressStats,
};
pub use types::{Chapter, Question, QuestionStatus, QuestionType, QuizModule, QuizOption, ReviewState};
pub use validator::{
    validate, validate_and_normalize, validate_json_text, validate_value_and_normalize,
    ValidationResult,
};
