//! Common test utilities for quiz-core integration tests.
//!
//! Fixture documents live in `libs/quiz-core/fixtures/` and are embedded at
//! compile time so the tests do not depend on the working directory.

#![allow(dead_code)]

pub mod fixtures;

use chrono::{DateTime, TimeZone, Utc};

use quiz_core::{parse_markdown, QuizModule};

/// The full-marker default quiz.
pub const DEFAULT_QUIZ: &str = include_str!("../../fixtures/default-quiz.md");

/// The same quiz written with `**Opt:**` / `**Ans:**` / `**Exp:**`.
pub const DEFAULT_QUIZ_SHORT: &str = include_str!("../../fixtures/default-quiz-short.md");

/// A fixed clock for deterministic scheduling.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, 1, 12, 0, 0).unwrap()
}

/// Parse `content`, panicking with the parser's messages on failure.
pub fn parse_ok(content: &str) -> QuizModule {
    let result = parse_markdown(content);
    assert!(result.success, "parse failed: {:#?}", result.errors);
    result.quiz_module.expect("successful parse carries a module")
}

/// Question IDs of a module in document order.
pub fn question_ids(module: &QuizModule) -> Vec<String> {
    module.questions().map(|q| q.question_id.clone()).collect()
}
