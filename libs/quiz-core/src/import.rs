//! End-to-end import: parse or decode, validate, normalize.

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{QuizError, Result};
use crate::parser::parse_markdown;
use crate::types::QuizModule;
use crate::validator::{validate_and_normalize, validate_value_and_normalize};

/// Source document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Markdown,
    Json,
}

impl SourceFormat {
    /// Guess from a file extension, if it is a known one.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "md" | "markdown" => Some(Self::Markdown),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// JSON documents start with `{`. Anything else is treated as markdown.
pub fn detect_format(content: &str) -> SourceFormat {
    match content.trim_start().as_bytes().first() {
        Some(b'{') => SourceFormat::Json,
        _ => SourceFormat::Markdown,
    }
}

/// Outcome of [`import_quiz`]. `errors` holds messages from every stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub success: bool,
    pub quiz_module: Option<QuizModule>,
    pub errors: Vec<String>,
}

/// Import a quiz document. `format` of `None` means detect it.
pub fn import_quiz(content: &str, format: Option<SourceFormat>) -> ImportResult {
    let format = format.unwrap_or_else(|| detect_format(content));
    debug!(?format, bytes = content.len(), "importing quiz");

    let result = match format {
        SourceFormat::Json => {
            let validated = validate_and_normalize(content);
            ImportResult {
                success: validated.is_valid,
                quiz_module: validated.quiz_module,
                errors: validated.errors,
            }
        }
        SourceFormat::Markdown => import_markdown(content),
    };

    if let Some(module) = &result.quiz_module {
        info!(
            module = %module.name,
            chapters = module.chapters.len(),
            questions = module.question_count(),
            "imported quiz"
        );
    }
    result
}

fn import_markdown(content: &str) -> ImportResult {
    let parsed = parse_markdown(content);
    let mut errors = parsed.errors;

    let Some(module) = parsed.quiz_module.filter(|_| parsed.success) else {
        return ImportResult {
            success: false,
            quiz_module: None,
            errors,
        };
    };

    let value = match serde_json::to_value(&module) {
        Ok(value) => value,
        Err(e) => {
            errors.push(QuizError::Encode(e).to_string());
            return ImportResult {
                success: false,
                quiz_module: None,
                errors,
            };
        }
    };

    let validated = validate_value_and_normalize(&value);
    errors.extend(validated.errors);
    ImportResult {
        success: validated.is_valid,
        quiz_module: validated.quiz_module,
        errors,
    }
}

/// Pretty-printed JSON for a module.
pub fn to_json(module: &QuizModule) -> Result<String> {
    serde_json::to_string_pretty(module).map_err(QuizError::Encode)
}

/// Decode a module from JSON without validating it.
pub fn from_json(text: &str) -> Result<QuizModule> {
    let value: serde_json::Value = serde_json::from_str(text).map_err(QuizError::Syntax)?;
    serde_json::from_value(value).map_err(QuizError::Structure)
}
