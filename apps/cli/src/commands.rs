use std::fs;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use tracing::{debug, info, warn};

use quiz_core::{
    answer_question, correct_module_latex, due_questions, import_quiz, reset_progress, to_json,
    validate_and_normalize, validate_json_text, ModuleStats, QuizModule, SourceFormat,
};

use crate::cli::FormatArg;
use crate::config::Config;

pub fn cmd_import(
    file: &Path,
    format: Option<FormatArg>,
    fix_latex: bool,
    output: Option<&Path>,
) -> Result<ExitCode> {
    let content = read_file(file)?;
    let format = format.map(SourceFormat::from).or_else(|| format_from_path(file));
    let result = import_quiz(&content, format);

    for message in &result.errors {
        eprintln!("{message}");
    }
    let Some(module) = result.quiz_module.filter(|_| result.success) else {
        eprintln!("Import failed: {}", file.display());
        return Ok(ExitCode::FAILURE);
    };

    let module = if fix_latex {
        correct_module_latex(&module)
    } else {
        module
    };
    write_module(&module, output)?;
    Ok(ExitCode::SUCCESS)
}

pub fn cmd_validate(file: &Path, normalize: bool, json: bool) -> Result<ExitCode> {
    let content = read_file(file)?;
    let mut result = if normalize {
        validate_and_normalize(&content)
    } else {
        validate_json_text(&content)
    };

    if json {
        result.quiz_module = None;
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        for message in &result.errors {
            println!("{message}");
        }
        if result.is_valid {
            println!("{}: valid", file.display());
        } else {
            println!("{}: invalid ({} errors)", file.display(), result.errors.len());
        }
    }

    Ok(if result.is_valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

pub fn cmd_answer(
    file: &Path,
    question_id: &str,
    selected: &[String],
    output: Option<&Path>,
    config: &Config,
) -> Result<ExitCode> {
    let module = load_module(file)?;
    let Some(updated) = answer_question(&module, question_id, selected, config.now) else {
        bail!("Question '{}' not found in {}", question_id, file.display());
    };

    if let Some(question) = updated.find_question(question_id) {
        info!(
            question = question_id,
            status = question.status.as_str(),
            srs_level = question.srs_level,
            "recorded answer"
        );
    }
    write_module(&updated, output)?;
    Ok(ExitCode::SUCCESS)
}

pub fn cmd_due(file: &Path, json: bool, config: &Config) -> Result<ExitCode> {
    let module = load_module(file)?;
    let stats = ModuleStats::compute(&module, config.now);

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!("{}", stats.name);
    for chapter in &stats.chapters {
        println!(
            "  {:<30} {:>3} due  {:>3}/{:<3} answered  {:>3} mastered",
            chapter.name,
            chapter.progress.due_questions,
            chapter.progress.answered_questions,
            chapter.progress.total_questions,
            chapter.progress.mastered_questions,
        );
    }
    println!(
        "Total: {} due, {}/{} answered, {} correct, {} mastered",
        stats.progress.due_questions,
        stats.progress.answered_questions,
        stats.progress.total_questions,
        stats.progress.correct_answers,
        stats.progress.mastered_questions,
    );
    for question in due_questions(&module, config.now) {
        debug!(question = %question.question_id, "due");
    }
    Ok(ExitCode::SUCCESS)
}

pub fn cmd_reset(file: &Path, output: Option<&Path>) -> Result<ExitCode> {
    let module = load_module(file)?;
    write_module(&reset_progress(&module), output)?;
    Ok(ExitCode::SUCCESS)
}

/// Import `file` through the full pipeline, failing on any blocking error.
fn load_module(file: &Path) -> Result<QuizModule> {
    let content = read_file(file)?;
    let result = import_quiz(&content, format_from_path(file));
    match result.quiz_module.filter(|_| result.success) {
        Some(module) => {
            for message in &result.errors {
                warn!("{message}");
            }
            Ok(module)
        }
        None => bail!(
            "Failed to load quiz {}:\n{}",
            file.display(),
            result.errors.join("\n")
        ),
    }
}

fn format_from_path(path: &Path) -> Option<SourceFormat> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(SourceFormat::from_extension)
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn write_module(module: &QuizModule, output: Option<&Path>) -> Result<()> {
    let json = to_json(module)?;
    match output {
        Some(path) => {
            fs::write(path, format!("{json}\n"))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), "wrote quiz");
        }
        None => println!("{json}"),
    }
    Ok(())
}
