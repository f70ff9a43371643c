//! Structural validation of untyped quiz JSON.
//!
//! Every rule is checked independently and all violations are collected.
//! Nothing here panics on malformed input.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ValidationIssue;
use crate::normalize::normalize;
use crate::types::{QuestionStatus, QuestionType, QuizModule};

/// Outcome of validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    /// Set only by [`validate_and_normalize`] when the input is usable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiz_module: Option<QuizModule>,
}

impl ValidationResult {
    fn from_issues(issues: &[ValidationIssue]) -> Self {
        Self {
            is_valid: issues.is_empty(),
            errors: issues.iter().map(ToString::to_string).collect(),
            quiz_module: None,
        }
    }
}

/// Validate an already-decoded JSON value.
pub fn validate(value: &Value) -> ValidationResult {
    ValidationResult::from_issues(&collect_issues(value))
}

/// Decode `text` as JSON and validate it.
pub fn validate_json_text(text: &str) -> ValidationResult {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => validate(&value),
        Err(e) => ValidationResult::from_issues(&[ValidationIssue::InvalidJson(e.to_string())]),
    }
}

/// Validate `text` and, when structurally sound, normalize it.
///
/// Duplicate IDs do not make the input invalid here: the normalizer
/// renames them and reports each rename in `errors`.
pub fn validate_and_normalize(text: &str) -> ValidationResult {
    let value = match serde_json::from_str::<Value>(text) {
        Ok(value) => value,
        Err(e) => {
            return ValidationResult::from_issues(&[ValidationIssue::InvalidJson(e.to_string())])
        }
    };
    validate_value_and_normalize(&value)
}

/// [`validate_and_normalize`] for an already-decoded value.
pub fn validate_value_and_normalize(value: &Value) -> ValidationResult {
    let issues = collect_issues(value);
    let blocking: Vec<&ValidationIssue> = issues.iter().filter(|i| !i.is_auto_fixable()).collect();
    if !blocking.is_empty() {
        return ValidationResult {
            is_valid: false,
            errors: blocking.iter().map(ToString::to_string).collect(),
            quiz_module: None,
        };
    }

    let module: QuizModule = match serde_json::from_value(value.clone()) {
        Ok(module) => module,
        Err(e) => {
            return ValidationResult {
                is_valid: false,
                errors: vec![crate::error::QuizError::Structure(e).to_string()],
                quiz_module: None,
            }
        }
    };

    let normalized = normalize(&module);
    ValidationResult {
        is_valid: true,
        errors: normalized.warnings,
        quiz_module: Some(normalized.module),
    }
}

fn collect_issues(value: &Value) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    let Some(root) = value.as_object() else {
        issues.push(ValidationIssue::RootNotObject);
        return issues;
    };

    if non_empty_str(root, "name").is_none() {
        issues.push(ValidationIssue::MissingModuleName);
    }

    let chapters = match root.get("chapters").and_then(Value::as_array) {
        Some(chapters) if !chapters.is_empty() => chapters,
        _ => {
            issues.push(ValidationIssue::MissingChapters);
            return issues;
        }
    };

    let mut chapter_ids: HashMap<String, String> = HashMap::new();
    let mut question_ids: HashMap<String, String> = HashMap::new();

    for (ci, chapter) in chapters.iter().enumerate() {
        let Some(chapter) = chapter.as_object() else {
            issues.push(ValidationIssue::NotAnObject {
                location: format!("Chapter {}", ci + 1),
            });
            continue;
        };

        let name = non_empty_str(chapter, "name");
        let label = name.map(str::to_string).unwrap_or_else(|| format!("#{}", ci + 1));
        let location = match name {
            Some(name) => format!("Chapter {} ('{}')", ci + 1, name),
            None => format!("Chapter {}", ci + 1),
        };

        match declared_id(chapter, "id") {
            Some(id) => {
                if let Some(first) = chapter_ids.get(id) {
                    issues.push(ValidationIssue::DuplicateChapterId {
                        id: id.to_string(),
                        chapter: label.clone(),
                        first_chapter: first.clone(),
                    });
                } else {
                    chapter_ids.insert(id.to_string(), label.clone());
                }
            }
            None => issues.push(ValidationIssue::MissingField {
                location: location.clone(),
                field: "id",
            }),
        }
        if name.is_none() {
            issues.push(ValidationIssue::MissingField {
                location: location.clone(),
                field: "name",
            });
        }

        let questions = match chapter.get("questions").and_then(Value::as_array) {
            Some(questions) if !questions.is_empty() => questions,
            _ => {
                issues.push(ValidationIssue::EmptyQuestions { location });
                continue;
            }
        };

        for (qi, question) in questions.iter().enumerate() {
            let location = format!("{}, question {}", location, qi + 1);
            let Some(question) = question.as_object() else {
                issues.push(ValidationIssue::NotAnObject { location });
                continue;
            };

            if let Some(id) = declared_id(question, "questionId") {
                if let Some(first) = question_ids.get(id) {
                    issues.push(ValidationIssue::DuplicateQuestionId {
                        id: id.to_string(),
                        chapter: label.clone(),
                        first_chapter: first.clone(),
                    });
                } else {
                    question_ids.insert(id.to_string(), label.clone());
                }
            }
            check_question(question, &location, &mut issues);
        }
    }

    debug!(issues = issues.len(), "validated quiz structure");
    issues
}

fn check_question(question: &Map<String, Value>, location: &str, issues: &mut Vec<ValidationIssue>) {
    for field in ["questionId", "questionText", "explanationText"] {
        if non_empty_str(question, field).is_none() {
            issues.push(ValidationIssue::MissingField {
                location: location.to_string(),
                field,
            });
        }
    }

    let options = question
        .get("options")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    if options.len() < 2 {
        issues.push(ValidationIssue::TooFewOptions {
            location: location.to_string(),
            found: options.len(),
        });
    }

    let mut option_ids: HashSet<&str> = HashSet::new();
    for (oi, option) in options.iter().enumerate() {
        let option_location = format!("{}, option {}", location, oi + 1);
        let Some(option) = option.as_object() else {
            issues.push(ValidationIssue::NotAnObject {
                location: option_location,
            });
            continue;
        };
        match non_empty_str(option, "optionId") {
            Some(id) => {
                if !option_ids.insert(id) {
                    issues.push(ValidationIssue::DuplicateOptionId {
                        location: location.to_string(),
                        option_id: id.to_string(),
                    });
                }
            }
            None => issues.push(ValidationIssue::MissingField {
                location: option_location.clone(),
                field: "optionId",
            }),
        }
        if !option.get("optionText").is_some_and(Value::is_string) {
            issues.push(ValidationIssue::MissingField {
                location: option_location,
                field: "optionText",
            });
        }
    }

    let correct = question
        .get("correctOptionIds")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    if correct.is_empty() {
        issues.push(ValidationIssue::NoCorrectOption {
            location: location.to_string(),
        });
    }
    for id in correct {
        let known = id.as_str().is_some_and(|id| option_ids.contains(id));
        if !known {
            issues.push(ValidationIssue::UnknownCorrectOption {
                location: location.to_string(),
                option_id: id.as_str().map(str::to_string).unwrap_or_else(|| id.to_string()),
            });
        }
    }

    check_enum(question, "type", location, issues, |s| QuestionType::from_str(s).is_some());
    check_enum(question, "status", location, issues, |s| QuestionStatus::from_str(s).is_some());
}

fn check_enum(
    object: &Map<String, Value>,
    field: &'static str,
    location: &str,
    issues: &mut Vec<ValidationIssue>,
    known: impl Fn(&str) -> bool,
) {
    match object.get(field) {
        None | Some(Value::Null) => {}
        Some(Value::String(s)) if known(s) => {}
        Some(other) => issues.push(ValidationIssue::InvalidEnumValue {
            location: location.to_string(),
            field,
            value: other.as_str().map(str::to_string).unwrap_or_else(|| other.to_string()),
        }),
    }
}

/// An ID exactly as written, so duplicates match what the normalizer renames.
fn declared_id<'a>(object: &'a Map<String, Value>, field: &str) -> Option<&'a str> {
    let id = object.get(field).and_then(Value::as_str)?;
    (!id.trim().is_empty()).then_some(id)
}

fn non_empty_str<'a>(object: &'a Map<String, Value>, field: &str) -> Option<&'a str> {
    object
        .get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
