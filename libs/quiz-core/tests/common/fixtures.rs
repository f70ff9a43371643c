//! Factory functions for test documents.

use serde_json::{json, Value};

/// Markdown for one chapter holding `num_questions` well-formed MCQs.
///
/// # Arguments
/// * `chapter` - Chapter heading text
/// * `num_questions` - Number of questions to generate
/// * `id_prefix` - When set, every question gets an explicit `<prefix><n>` ID
pub fn chapter_md(chapter: &str, num_questions: usize, id_prefix: Option<&str>) -> String {
    let questions = (1..=num_questions)
        .map(|i| {
            let id = id_prefix
                .map(|p| format!(" <!-- ID:{}{} -->", p, i))
                .unwrap_or_default();
            format!(
                "### Q: {} question {}?{}\n**Options:**\n- **A1:** Yes\n- **A2:** No\n**Correct:** A1\n**Exp:** Because {}.\n",
                chapter, i, id, i
            )
        })
        .collect::<Vec<_>>()
        .join("\n---\n\n");
    format!("## {}\n\n{}", chapter, questions)
}

/// A module document built from chapter snippets.
pub fn module_md(title: &str, chapters: &[String]) -> String {
    format!("# {}\n\n{}", title, chapters.join("\n"))
}

/// A minimal question as wire JSON.
pub fn question_json(id: &str) -> Value {
    json!({
        "questionId": id,
        "questionText": format!("Question {}?", id),
        "options": [
            { "optionId": "a", "optionText": "Yes" },
            { "optionId": "b", "optionText": "No" }
        ],
        "correctOptionIds": ["a"],
        "explanationText": "Because."
    })
}

/// A chapter as wire JSON.
pub fn chapter_json(id: &str, name: &str, questions: Vec<Value>) -> Value {
    json!({ "id": id, "name": name, "questions": questions })
}

/// A module as wire JSON.
pub fn module_json(name: &str, chapters: Vec<Value>) -> Value {
    json!({ "name": name, "chapters": chapters })
}
