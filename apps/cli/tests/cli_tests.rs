use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tempfile::TempDir;

const DEFAULT_QUIZ: &str = include_str!("../../../libs/quiz-core/fixtures/default-quiz.md");
const NOW: &str = "2024-09-01T12:00:00Z";

fn quiz_cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("quiz-srs"));
    cmd.current_dir(dir.path())
        .env_remove("RUST_LOG")
        .env("QUIZ_SRS_NOW", NOW);
    cmd
}

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

/// Import the default quiz into `quiz.json` and return its path.
fn imported_quiz(dir: &TempDir) -> PathBuf {
    let md = write(dir, "quiz.md", DEFAULT_QUIZ);
    let json = dir.path().join("quiz.json");
    quiz_cmd(dir)
        .arg("import")
        .arg(&md)
        .arg("-o")
        .arg(&json)
        .assert()
        .success();
    json
}

fn duplicate_json() -> String {
    let question = |id: &str| {
        json!({
            "questionId": id,
            "questionText": "Pick",
            "options": [
                { "optionId": "a", "optionText": "A" },
                { "optionId": "b", "optionText": "B" }
            ],
            "correctOptionIds": ["a"],
            "explanationText": "Because."
        })
    };
    json!({
        "name": "Dups",
        "chapters": [
            { "id": "ch1", "name": "One", "questions": [question("q1")] },
            { "id": "ch1", "name": "Two", "questions": [question("q1")] }
        ]
    })
    .to_string()
}

// =============================================================================
// Basic CLI
// =============================================================================

#[test]
fn test_help() {
    let dir = TempDir::new().unwrap();
    quiz_cmd(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("spaced repetition"));
}

#[test]
fn test_invalid_now_is_rejected() {
    let dir = TempDir::new().unwrap();
    let md = write(&dir, "quiz.md", DEFAULT_QUIZ);
    quiz_cmd(&dir)
        .env("QUIZ_SRS_NOW", "not a time")
        .arg("due")
        .arg(&md)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid QUIZ_SRS_NOW"));
}

// =============================================================================
// Import
// =============================================================================

#[test]
fn test_import_markdown_to_stdout() {
    let dir = TempDir::new().unwrap();
    let md = write(&dir, "quiz.md", DEFAULT_QUIZ);
    quiz_cmd(&dir)
        .arg("import")
        .arg(&md)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"Rust Fundamentals\""))
        .stdout(predicate::str::contains("\"questionId\": \"own-move\""));
}

#[test]
fn test_import_writes_output_file() {
    let dir = TempDir::new().unwrap();
    let json = imported_quiz(&dir);
    let module = read_json(&json);
    assert_eq!(module["chapters"].as_array().unwrap().len(), 3);
    assert_eq!(module["chapters"][0]["id"], "ch-ownership");
    assert!(module["chapters"][0]["questions"][0]["nextReviewAt"].is_null());
}

#[test]
fn test_import_without_title_fails() {
    let dir = TempDir::new().unwrap();
    let md = write(&dir, "broken.md", "## Chapter only\n");
    quiz_cmd(&dir)
        .arg("import")
        .arg(&md)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Expected module title"));
}

#[test]
fn test_import_reports_skipped_question() {
    let dir = TempDir::new().unwrap();
    let md = write(
        &dir,
        "partial.md",
        "# Partial\n## One\n### T/F: Sky is green\n**Correct:** Maybe\n**Exp:** No.\n\n### Q: Ok?\n**Options:**\n- **A1:** Yes\n- **A2:** No\n**Correct:** A1\n**Exp:** Yes.\n",
    );
    quiz_cmd(&dir)
        .arg("import")
        .arg(&md)
        .assert()
        .success()
        .stderr(predicate::str::contains("[Error] Line 4"))
        .stdout(predicate::str::contains("\"questionText\": \"Ok?\""));
}

#[test]
fn test_import_json_with_explicit_format() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "dups.txt", &duplicate_json());
    quiz_cmd(&dir)
        .args(["import", "--format", "json"])
        .arg(&path)
        .assert()
        .success()
        .stderr(predicate::str::contains("renamed to 'ch1_2'"))
        .stdout(predicate::str::contains("\"id\": \"ch1_2\""));
}

#[test]
fn test_import_fix_latex() {
    let dir = TempDir::new().unwrap();
    let mangled = r#"{
        "name": "Math",
        "chapters": [{
            "id": "ch1",
            "name": "Fractions",
            "questions": [{
                "questionId": "q1",
                "questionText": "What is $\frac{1}{2}$?",
                "options": [
                    { "optionId": "a", "optionText": "half" },
                    { "optionId": "b", "optionText": "two" }
                ],
                "correctOptionIds": ["a"],
                "explanationText": "One over two."
            }]
        }]
    }"#;
    let path = write(&dir, "math.json", mangled);
    let out = dir.path().join("fixed.json");
    quiz_cmd(&dir)
        .args(["import", "--fix-latex", "-o"])
        .arg(&out)
        .arg(&path)
        .assert()
        .success();
    let module = read_json(&out);
    assert_eq!(
        module["chapters"][0]["questions"][0]["questionText"],
        r"What is $\frac{1}{2}$?"
    );
}

// =============================================================================
// Validate
// =============================================================================

#[test]
fn test_validate_imported_quiz() {
    let dir = TempDir::new().unwrap();
    let json = imported_quiz(&dir);
    quiz_cmd(&dir)
        .arg("validate")
        .arg(&json)
        .assert()
        .success()
        .stdout(predicate::str::contains("valid"));
}

#[test]
fn test_validate_rejects_duplicates() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "dups.json", &duplicate_json());
    quiz_cmd(&dir)
        .arg("validate")
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::contains("Duplicate chapter ID found: 'ch1'"))
        .stdout(predicate::str::contains("invalid (2 errors)"));
}

#[test]
fn test_validate_normalize_accepts_duplicates() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "dups.json", &duplicate_json());
    let output = quiz_cmd(&dir)
        .args(["validate", "--normalize", "--json"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["isValid"], true);
    assert_eq!(report["errors"].as_array().unwrap().len(), 2);
    assert!(report.get("quizModule").is_none());
}

#[test]
fn test_validate_invalid_json() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "bad.json", "{ \"name\": ");
    quiz_cmd(&dir)
        .arg("validate")
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::contains("Invalid JSON syntax"));
}

// =============================================================================
// Study
// =============================================================================

#[test]
fn test_answer_schedules_review() {
    let dir = TempDir::new().unwrap();
    let json = imported_quiz(&dir);
    quiz_cmd(&dir)
        .args(["answer", "--question", "own-move", "--option", "A2", "-o"])
        .arg(&json)
        .arg(&json)
        .assert()
        .success();

    let module = read_json(&json);
    let question = &module["chapters"][0]["questions"][0];
    assert_eq!(question["status"], "passed_once");
    assert_eq!(question["srsLevel"], 1);
    assert_eq!(question["nextReviewAt"], "2024-09-01T12:10:00Z");
    assert_eq!(question["lastSelectedOptionId"], "A2");
    assert_eq!(module["chapters"][0]["answeredQuestions"], 1);
}

#[test]
fn test_answer_unknown_question() {
    let dir = TempDir::new().unwrap();
    let json = imported_quiz(&dir);
    quiz_cmd(&dir)
        .args(["answer", "--question", "missing", "--option", "A1"])
        .arg(&json)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_due_counts() {
    let dir = TempDir::new().unwrap();
    let json = imported_quiz(&dir);
    quiz_cmd(&dir)
        .args(["answer", "--question", "own-string-copy", "--option", "true", "-o"])
        .arg(&json)
        .arg(&json)
        .assert()
        .success();

    let output = quiz_cmd(&dir)
        .args(["due", "--json"])
        .arg(&json)
        .output()
        .unwrap();
    assert!(output.status.success());
    let stats: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(stats["totalQuestions"], 8);
    assert_eq!(stats["answeredQuestions"], 1);
    assert_eq!(stats["dueQuestions"], 7);

    quiz_cmd(&dir)
        .env("QUIZ_SRS_NOW", "2024-09-01T12:00:30Z")
        .arg("due")
        .arg(&json)
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: 8 due"));
}

#[test]
fn test_reset_clears_progress() {
    let dir = TempDir::new().unwrap();
    let json = imported_quiz(&dir);
    let fresh = read_json(&json);
    quiz_cmd(&dir)
        .args(["answer", "--question", "own-move", "--option", "A1", "-o"])
        .arg(&json)
        .arg(&json)
        .assert()
        .success();
    assert_ne!(read_json(&json), fresh);

    quiz_cmd(&dir)
        .args(["reset", "-o"])
        .arg(&json)
        .arg(&json)
        .assert()
        .success();
    assert_eq!(read_json(&json), fresh);
}
