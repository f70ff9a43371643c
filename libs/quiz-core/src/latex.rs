//! Repair of LaTeX commands mangled by JSON string escaping.
//!
//! Authors often write `"$\frac{1}{2}$"` in JSON, which decodes to a form
//! feed followed by `rac`. Inside math delimiters those control characters
//! are turned back into commands, and runs of backslashes in front of a
//! command name collapse to one. Text outside `$...$` / `$$...$$` is never
//! touched.

use crate::types::{Chapter, Question, QuizModule, QuizOption};

/// Commands starting with `n` that an unescaped `\n` may have eaten.
const N_COMMANDS: &[&str] = &[
    "nabla", "natural", "ne", "nearrow", "neg", "neq", "newline", "nexists", "ni", "nmid",
    "not", "notin", "nparallel", "nsubseteq", "nu", "nwarrow",
];

#[derive(Debug, Clone, Copy, PartialEq)]
enum Segment {
    Text,
    Math,
}

/// Correct malformed escapes inside math spans of `input`.
pub fn correct_latex(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for (kind, text) in split_math(input) {
        match kind {
            Segment::Text => out.push_str(text),
            Segment::Math => out.push_str(&fix_math(text)),
        }
    }
    out
}

/// Apply [`correct_latex`] to every question, option and explanation text.
pub fn correct_module_latex(module: &QuizModule) -> QuizModule {
    QuizModule {
        chapters: module
            .chapters
            .iter()
            .map(|chapter| Chapter {
                questions: chapter.questions.iter().map(correct_question_latex).collect(),
                ..chapter.clone()
            })
            .collect(),
        ..module.clone()
    }
}

fn correct_question_latex(question: &Question) -> Question {
    Question {
        question_text: correct_latex(&question.question_text),
        explanation_text: correct_latex(&question.explanation_text),
        options: question
            .options
            .iter()
            .map(|o| QuizOption {
                option_text: correct_latex(&o.option_text),
                ..o.clone()
            })
            .collect(),
        ..question.clone()
    }
}

/// Split into text and math segments. Delimiters stay attached to the math
/// segment; an unclosed delimiter leaves the rest as text.
fn split_math(input: &str) -> Vec<(Segment, &str)> {
    let bytes = input.as_bytes();
    let mut segments = Vec::new();
    let mut text_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'$' => {
                let display = bytes.get(i + 1) == Some(&b'$');
                let open_len = if display { 2 } else { 1 };
                match find_close(bytes, i + open_len, display) {
                    Some(close) => {
                        let end = close + open_len;
                        if text_start < i {
                            segments.push((Segment::Text, &input[text_start..i]));
                        }
                        segments.push((Segment::Math, &input[i..end]));
                        i = end;
                        text_start = end;
                    }
                    None => i += open_len,
                }
            }
            _ => i += 1,
        }
    }

    if text_start < input.len() {
        segments.push((Segment::Text, &input[text_start..]));
    }
    segments
}

fn find_close(bytes: &[u8], from: usize, display: bool) -> Option<usize> {
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'$' if display => {
                if bytes.get(i + 1) == Some(&b'$') {
                    return Some(i);
                }
                i += 1;
            }
            b'$' => return (i > from).then_some(i),
            _ => i += 1,
        }
    }
    None
}

fn fix_math(math: &str) -> String {
    collapse_backslashes(&restore_control_chars(math))
}

fn restore_control_chars(math: &str) -> String {
    let mut out = String::with_capacity(math.len() + 8);
    for (idx, c) in math.char_indices() {
        let replacement = match c {
            '\t' => Some("\\t"),
            '\u{8}' => Some("\\b"),
            '\u{c}' => Some("\\f"),
            '\u{b}' => Some("\\v"),
            '\r' if starts_with_letter(&math[idx + 1..]) => Some("\\r"),
            '\n' if starts_n_command(&math[idx + 1..]) => Some("\\n"),
            _ => None,
        };
        match replacement {
            Some(command) => out.push_str(command),
            None => out.push(c),
        }
    }

    out
}

fn starts_with_letter(rest: &str) -> bool {
    rest.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
}

fn starts_n_command(rest: &str) -> bool {
    let word: String = rest.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
    !word.is_empty() && N_COMMANDS.contains(&format!("n{}", word).as_str())
}

/// `\\frac` -> `\frac`. A lone `\\` line break is left alone.
fn collapse_backslashes(math: &str) -> String {
    let mut out = String::with_capacity(math.len());
    let mut chars = math.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let mut run = 1;
        while chars.peek() == Some(&'\\') {
            chars.next();
            run += 1;
        }
        let before_letter = chars.peek().is_some_and(|c| c.is_ascii_alphabetic());
        if run >= 2 && before_letter {
            out.push('\\');
        } else {
            out.extend(std::iter::repeat('\\').take(run));
        }
    }

    out
}
