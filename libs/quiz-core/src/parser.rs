//! Markdown parser for quiz modules.
//!
//! # Format
//! ```markdown
//! # Rust Basics
//! Description: _Ownership and friends_
//!
//! ## Ownership <!-- ID:ch-own -->
//!
//! ### Q: Which keyword moves a closure's captures? <!-- ID:q1 -->
//! **Options:**
//! - **A1:** `ref`
//! - **A2:** `move`
//! **Correct:** A2
//! **Exp:** `move` forces captured values into the closure.
//!
//! ---
//!
//! ### T/F: `String` implements `Copy`.
//! <!-- Q_ID:q2 -->
//! **Ans:** False
//! **Explanation:** It owns a heap buffer, so it can only be cloned.
//! ```
//!
//! Options may also be written as a bare list (`- A) text`). Content inside
//! fenced code blocks is never treated as structure. A malformed question is
//! reported and skipped; parsing continues at the next heading.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::dedup::plan_renames;
use crate::error::{LocatedIssue, ParseIssue, Severity};
use crate::types::{Chapter, Question, QuestionType, QuizModule, QuizOption};

static ID_COMMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<!--\s*(CH_ID|Q_ID|ID)\s*:\s*(.*?)\s*-->").expect("valid id comment regex")
});

static LABELED_OPTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[-*+]\s+)?\*\*([A-Za-z][A-Za-z0-9]*)\s*(?::\*\*|\*\*\s*:)\s*(.*)$")
        .expect("valid labeled option regex")
});

static BULLETED_OPTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[-*+]\s+([A-Za-z][0-9]*)\)\s*(.*)$").expect("valid bulleted option regex")
});

/// Maximum length of the heading slug used in generated question IDs.
const QUESTION_SLUG_LEN: usize = 40;

/// Outcome of parsing a markdown document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResult {
    pub success: bool,
    pub quiz_module: Option<QuizModule>,
    pub errors: Vec<String>,
}

/// Parse quiz markdown into a module. Never panics on malformed input.
pub fn parse_markdown(content: &str) -> ParseResult {
    let mut parser = Parser::new();
    for (idx, line) in content.lines().enumerate() {
        parser.process_line(line, idx + 1);
    }
    parser.finish()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    Options,
    Correct,
    Explanation,
}

const MARKERS: &[(&str, Marker)] = &[
    ("Options:", Marker::Options),
    ("Opt:", Marker::Options),
    ("Correct:", Marker::Correct),
    ("Ans:", Marker::Correct),
    ("Explanation:", Marker::Explanation),
    ("Exp:", Marker::Explanation),
];

enum LineType<'a> {
    ModuleTitle(&'a str),
    Chapter(&'a str),
    Question(&'a str),
    Separator,
    Marker(Marker, &'a str),
    Description(&'a str),
    IdComment(IdKey, &'a str),
    Fence,
    Text(&'a str),
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IdKey {
    Any,
    Chapter,
    Question,
}

impl IdKey {
    fn from_str(key: &str) -> Self {
        match key.to_ascii_uppercase().as_str() {
            "CH_ID" => Self::Chapter,
            "Q_ID" => Self::Question,
            _ => Self::Any,
        }
    }

    fn fits_chapter(self) -> bool {
        self != Self::Question
    }

    fn fits_question(self) -> bool {
        self != Self::Chapter
    }
}

/// Section of a question that plain lines are appended to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Body,
    Options,
    Correct,
    Explanation,
}

#[derive(Debug, Clone)]
struct OptionLine {
    line: usize,
    text: String,
    fenced: bool,
}

/// The option block shapes accepted under `**Options:**`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OptionSyntax {
    /// `**A1:** text` or `- **A1:** text`
    Labeled,
    /// `- A) text`
    Bulleted,
}

impl OptionSyntax {
    fn regex(self) -> &'static Regex {
        match self {
            Self::Labeled => &*LABELED_OPTION,
            Self::Bulleted => &*BULLETED_OPTION,
        }
    }
}

/// Pick the syntax from the first non-blank option line.
fn detect_option_syntax(lines: &[OptionLine]) -> Option<OptionSyntax> {
    let first = lines.iter().find(|l| !l.text.trim().is_empty())?;
    let text = first.text.trim();
    if LABELED_OPTION.is_match(text) {
        Some(OptionSyntax::Labeled)
    } else if BULLETED_OPTION.is_match(text) {
        Some(OptionSyntax::Bulleted)
    } else {
        None
    }
}

fn looks_like_option(text: &str) -> bool {
    text.starts_with("**")
        || text.starts_with("- ")
        || text.starts_with("* ")
        || text.starts_with("+ ")
}

fn parse_options(lines: &[OptionLine], syntax: OptionSyntax) -> Result<Vec<QuizOption>, LocatedIssue> {
    let regex = syntax.regex();
    let mut options: Vec<(usize, QuizOption)> = Vec::new();

    for line in lines {
        let text = line.text.trim();
        if text.is_empty() {
            continue;
        }
        if !line.fenced {
            if let Some(caps) = regex.captures(text) {
                let label = caps[1].to_string();
                options.push((line.line, QuizOption::new(label, caps[2].trim())));
                continue;
            }
        }
        match options.last_mut() {
            Some((_, option)) if line.fenced || !looks_like_option(text) => {
                if !option.option_text.is_empty() {
                    option.option_text.push('\n');
                }
                option.option_text.push_str(if line.fenced { line.text.as_str() } else { text });
            }
            _ => {
                return Err(LocatedIssue {
                    line: Some(line.line),
                    issue: ParseIssue::UnparseableOption {
                        text: text.to_string(),
                    },
                })
            }
        }
    }

    options
        .into_iter()
        .map(|(line, option)| {
            if option.option_text.trim().is_empty() {
                Err(LocatedIssue {
                    line: Some(line),
                    issue: ParseIssue::EmptyOption {
                        label: option.option_id,
                    },
                })
            } else {
                Ok(option)
            }
        })
        .collect()
}

/// Split a `**Correct:**` value into bare labels.
fn extract_labels(value: &str) -> Vec<String> {
    value
        .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .map(|s| s.trim_matches(|c| c == '*' || c == '`' || c == '_'))
        .map(|s| s.trim_end_matches(|c| c == ')' || c == '.' || c == ':'))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn strip_emphasis(text: &str) -> String {
    let text = text.trim();
    for mark in ["**", "__", "_", "*"] {
        if text.len() > 2 * mark.len() && text.starts_with(mark) && text.ends_with(mark) {
            return text[mark.len()..text.len() - mark.len()].trim().to_string();
        }
    }
    text.to_string()
}

/// Split a heading into its text and an inline ID comment.
fn split_heading(text: &str) -> (String, Option<(IdKey, String)>) {
    let id = ID_COMMENT
        .captures(text)
        .map(|caps| (IdKey::from_str(&caps[1]), caps[2].trim().to_string()))
        .filter(|(_, value)| !value.is_empty());
    let text = ID_COMMENT.replace_all(text, "").trim().to_string();
    (text, id)
}

fn short_title(text: &str) -> String {
    let first_line = text.lines().next().unwrap_or_default();
    if first_line.chars().count() > 60 {
        let cut: String = first_line.chars().take(57).collect();
        format!("{}...", cut.trim_end())
    } else {
        first_line.to_string()
    }
}

struct QuestionBuilder {
    kind: QuestionType,
    heading: String,
    id: Option<String>,
    ordinal: usize,
    start_line: usize,
    section: Section,
    body: Vec<String>,
    options: Option<(usize, Vec<OptionLine>)>,
    correct: Option<(usize, String)>,
    explanation: Option<Vec<String>>,
}

struct ParsedQuestion {
    declared_id: Option<String>,
    ordinal: usize,
    line: usize,
    question: Question,
}

impl QuestionBuilder {
    fn new(kind: QuestionType, heading: String, id: Option<String>, ordinal: usize, line: usize) -> Self {
        Self {
            kind,
            heading,
            id,
            ordinal,
            start_line: line,
            section: Section::Body,
            body: Vec::new(),
            options: None,
            correct: None,
            explanation: None,
        }
    }

    fn push_text(&mut self, text: &str, line: usize, fenced: bool) {
        match self.section {
            Section::Body => self.body.push(text.to_string()),
            Section::Options => {
                if let Some((_, lines)) = self.options.as_mut() {
                    lines.push(OptionLine {
                        line,
                        text: text.to_string(),
                        fenced,
                    });
                }
            }
            Section::Correct => {
                if !text.trim().is_empty() {
                    debug!(line, "ignoring text after correct answer line");
                }
            }
            Section::Explanation => {
                if let Some(explanation) = self.explanation.as_mut() {
                    explanation.push(text.to_string());
                }
            }
        }
    }

    fn marker(&mut self, marker: Marker, value: &str, line: usize) {
        match marker {
            Marker::Options => {
                self.options = Some((line, Vec::new()));
                self.section = Section::Options;
            }
            Marker::Correct => {
                self.correct = Some((line, value.to_string()));
                self.section = Section::Correct;
            }
            Marker::Explanation => {
                let first = if value.is_empty() { vec![] } else { vec![value.to_string()] };
                self.explanation = Some(first);
                self.section = Section::Explanation;
            }
        }
    }

    fn question_text(&self) -> String {
        let body = self.body.join("\n");
        let body = body.trim_matches('\n').trim_end();
        if body.trim().is_empty() {
            self.heading.clone()
        } else {
            format!("{}\n\n{}", self.heading, body)
        }
    }

    fn build(self) -> Result<ParsedQuestion, LocatedIssue> {
        let title = short_title(&self.heading);
        let fail = |line: usize, issue: ParseIssue| LocatedIssue {
            line: Some(line),
            issue,
        };

        let (options, correct_option_ids) = match self.kind {
            QuestionType::TrueFalse => {
                if let Some((line, _)) = &self.options {
                    return Err(fail(*line, ParseIssue::TrueFalseWithOptions { question: title }));
                }
                let (line, value) = self.correct.as_ref().ok_or_else(|| {
                    fail(self.start_line, ParseIssue::MissingCorrectAnswer { question: title.clone() })
                })?;
                let labels = extract_labels(value);
                let answer = match labels.as_slice() {
                    [one] if one.eq_ignore_ascii_case("true") => "true",
                    [one] if one.eq_ignore_ascii_case("false") => "false",
                    [] => {
                        return Err(fail(*line, ParseIssue::MissingCorrectAnswer { question: title }))
                    }
                    _ => {
                        return Err(fail(
                            *line,
                            ParseIssue::InvalidTrueFalseAnswer {
                                value: value.clone(),
                            },
                        ))
                    }
                };
                (
                    vec![QuizOption::new("true", "True"), QuizOption::new("false", "False")],
                    vec![answer.to_string()],
                )
            }
            QuestionType::Mcq => {
                let (options_line, lines) = self.options.as_ref().ok_or_else(|| {
                    fail(self.start_line, ParseIssue::MissingOptions { question: title.clone() })
                })?;
                let options = match detect_option_syntax(lines) {
                    Some(syntax) => parse_options(lines, syntax)?,
                    None => match lines.iter().find(|l| !l.text.trim().is_empty()) {
                        Some(first) => {
                            return Err(fail(
                                first.line,
                                ParseIssue::UnparseableOption {
                                    text: first.text.trim().to_string(),
                                },
                            ))
                        }
                        None => Vec::new(),
                    },
                };
                if options.len() < 2 {
                    return Err(fail(
                        *options_line,
                        ParseIssue::TooFewOptions {
                            question: title,
                            found: options.len(),
                        },
                    ));
                }
                for (i, option) in options.iter().enumerate() {
                    if options[..i]
                        .iter()
                        .any(|o| o.option_id.eq_ignore_ascii_case(&option.option_id))
                    {
                        return Err(fail(
                            *options_line,
                            ParseIssue::DuplicateOption {
                                question: title,
                                label: option.option_id.clone(),
                            },
                        ));
                    }
                }

                let (line, value) = self.correct.as_ref().ok_or_else(|| {
                    fail(self.start_line, ParseIssue::MissingCorrectAnswer { question: title.clone() })
                })?;
                let labels = extract_labels(value);
                if labels.is_empty() {
                    return Err(fail(*line, ParseIssue::MissingCorrectAnswer { question: title }));
                }
                let mut correct: Vec<String> = Vec::new();
                for label in labels {
                    let option = options
                        .iter()
                        .find(|o| o.option_id.eq_ignore_ascii_case(&label))
                        .ok_or_else(|| {
                            fail(
                                *line,
                                ParseIssue::UnknownCorrectOption {
                                    question: title.clone(),
                                    label: label.clone(),
                                },
                            )
                        })?;
                    if !correct.contains(&option.option_id) {
                        correct.push(option.option_id.clone());
                    }
                }
                (options, correct)
            }
        };

        let explanation = self
            .explanation
            .as_ref()
            .map(|lines| lines.join("\n").trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| {
                fail(self.start_line, ParseIssue::MissingExplanation { question: title.clone() })
            })?;

        let question = Question::new(
            String::new(),
            self.question_text(),
            options,
            correct_option_ids,
            explanation,
            self.kind,
        );

        Ok(ParsedQuestion {
            declared_id: self.id,
            ordinal: self.ordinal,
            line: self.start_line,
            question,
        })
    }
}

struct ChapterBuilder {
    name: String,
    id: Option<String>,
    description: Option<String>,
    ordinal: usize,
    line: usize,
    question_headings: usize,
    questions: Vec<ParsedQuestion>,
}

struct Parser {
    title: Option<String>,
    description: Option<String>,
    chapters: Vec<ChapterBuilder>,
    current_chapter: Option<ChapterBuilder>,
    current_question: Option<QuestionBuilder>,
    issues: Vec<LocatedIssue>,
    fence: Option<&'static str>,
}

impl Parser {
    fn new() -> Self {
        Self {
            title: None,
            description: None,
            chapters: Vec::new(),
            current_chapter: None,
            current_question: None,
            issues: Vec::new(),
            fence: None,
        }
    }

    fn process_line(&mut self, line: &str, line_num: usize) {
        let in_fence = self.fence.is_some();
        match self.parse_line(line) {
            LineType::ModuleTitle(text) => self.handle_title(line, text, line_num),
            LineType::Chapter(text) => self.handle_chapter(text, line_num),
            LineType::Question(text) => self.handle_question(text, line_num),
            LineType::Separator => self.finish_question(),
            LineType::Marker(marker, value) => match self.current_question.as_mut() {
                Some(question) => question.marker(marker, value, line_num),
                None => debug!(line = line_num, "marker outside of a question"),
            },
            LineType::Description(value) => self.handle_description(line, value, line_num),
            LineType::IdComment(key, value) => self.handle_id_comment(line, key, value, line_num),
            LineType::Fence => {
                if let Some(question) = self.current_question.as_mut() {
                    question.push_text(line, line_num, true);
                }
            }
            LineType::Text(text) => {
                if let Some(question) = self.current_question.as_mut() {
                    question.push_text(text, line_num, in_fence);
                }
            }
            LineType::Empty => {
                if let Some(question) = self.current_question.as_mut() {
                    question.push_text("", line_num, in_fence);
                }
            }
        }
    }

    fn parse_line<'a>(&mut self, line: &'a str) -> LineType<'a> {
        let trimmed = line.trim();

        if let Some(fence) = self.fence {
            if closes_fence(trimmed, fence) {
                self.fence = None;
                return LineType::Fence;
            }
            return LineType::Text(line);
        }
        for fence in ["```", "~~~"] {
            if trimmed.starts_with(fence) {
                self.fence = Some(fence);
                return LineType::Fence;
            }
        }

        if let Some(rest) = trimmed.strip_prefix("### ") {
            LineType::Question(rest.trim())
        } else if let Some(rest) = trimmed.strip_prefix("## ") {
            LineType::Chapter(rest.trim())
        } else if let Some(rest) = trimmed.strip_prefix("# ") {
            LineType::ModuleTitle(rest.trim())
        } else if trimmed.len() >= 3 && trimmed.chars().all(|c| c == '-') {
            LineType::Separator
        } else if let Some((marker, value)) = Self::parse_marker(trimmed) {
            LineType::Marker(marker, value)
        } else if let Some(rest) = trimmed.strip_prefix("Description:") {
            LineType::Description(rest.trim())
        } else if let Some(caps) = ID_COMMENT.captures(trimmed) {
            let whole = caps.get(0).map(|m| m.as_str().len()).unwrap_or_default();
            let value = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
            if whole == trimmed.len() && !value.is_empty() {
                LineType::IdComment(IdKey::from_str(&caps[1]), value)
            } else {
                LineType::Text(line)
            }
        } else if trimmed.is_empty() {
            LineType::Empty
        } else {
            LineType::Text(line)
        }
    }

    fn parse_marker(trimmed: &str) -> Option<(Marker, &str)> {
        let rest = trimmed.strip_prefix("**")?;
        MARKERS.iter().find_map(|(keyword, marker)| {
            let after = rest.strip_prefix(keyword)?;
            let value = match after.strip_prefix("**") {
                Some(value) => value.trim(),
                None => after.trim().trim_end_matches("**").trim(),
            };
            Some((*marker, value))
        })
    }

    fn handle_title(&mut self, line: &str, text: &str, line_num: usize) {
        if self.title.is_none() && self.current_chapter.is_none() && self.chapters.is_empty() {
            let (name, _) = split_heading(text);
            if !name.is_empty() {
                self.title = Some(name);
                return;
            }
        }
        if let Some(question) = self.current_question.as_mut() {
            question.push_text(line, line_num, false);
        }
    }

    fn handle_chapter(&mut self, text: &str, line_num: usize) {
        self.finish_chapter();
        let (name, id) = split_heading(text);
        let ordinal = self.chapters.len() + 1;
        self.current_chapter = Some(ChapterBuilder {
            name,
            id: id.filter(|(key, _)| key.fits_chapter()).map(|(_, value)| value),
            description: None,
            ordinal,
            line: line_num,
            question_headings: 0,
            questions: Vec::new(),
        });
    }

    fn handle_question(&mut self, text: &str, line_num: usize) {
        self.finish_question();

        let Some(chapter) = self.current_chapter.as_mut() else {
            self.issues.push(LocatedIssue {
                line: Some(line_num),
                issue: ParseIssue::QuestionOutsideChapter,
            });
            return;
        };
        chapter.question_headings += 1;

        let (heading, id) = split_heading(text);
        let (kind, rest) = if let Some(rest) = strip_prefix_ignore_case(&heading, "Q:") {
            (QuestionType::Mcq, rest)
        } else if let Some(rest) = strip_prefix_ignore_case(&heading, "T/F:") {
            (QuestionType::TrueFalse, rest)
        } else {
            self.issues.push(LocatedIssue {
                line: Some(line_num),
                issue: ParseIssue::UnknownQuestionKind {
                    heading: short_title(&heading),
                },
            });
            return;
        };

        self.current_question = Some(QuestionBuilder::new(
            kind,
            rest.trim().to_string(),
            id.filter(|(key, _)| key.fits_question()).map(|(_, value)| value),
            chapter.question_headings,
            line_num,
        ));
    }

    fn handle_description(&mut self, line: &str, value: &str, line_num: usize) {
        if let Some(question) = self.current_question.as_mut() {
            question.push_text(line, line_num, false);
        } else if let Some(chapter) = self.current_chapter.as_mut() {
            if chapter.question_headings == 0 && chapter.description.is_none() {
                chapter.description = Some(strip_emphasis(value)).filter(|d| !d.is_empty());
            }
        } else if self.title.is_some() && self.description.is_none() {
            self.description = Some(strip_emphasis(value)).filter(|d| !d.is_empty());
        }
    }

    fn handle_id_comment(&mut self, line: &str, key: IdKey, value: &str, line_num: usize) {
        if let Some(question) = self.current_question.as_mut() {
            if question.section == Section::Body && question.id.is_none() && key.fits_question() {
                question.id = Some(value.to_string());
            } else {
                question.push_text(line, line_num, false);
            }
        } else if let Some(chapter) = self.current_chapter.as_mut() {
            if chapter.question_headings == 0 && chapter.id.is_none() && key.fits_chapter() {
                chapter.id = Some(value.to_string());
            }
        }
    }

    fn finish_question(&mut self) {
        let Some(builder) = self.current_question.take() else {
            return;
        };
        match builder.build() {
            Ok(parsed) => {
                if let Some(chapter) = self.current_chapter.as_mut() {
                    chapter.questions.push(parsed);
                }
            }
            Err(issue) => {
                debug!(%issue, "skipping malformed question");
                self.issues.push(issue);
            }
        }
    }

    fn finish_chapter(&mut self) {
        self.finish_question();
        if let Some(chapter) = self.current_chapter.take() {
            self.chapters.push(chapter);
        }
    }

    fn finish(mut self) -> ParseResult {
        self.finish_chapter();

        let Some(name) = self.title.take() else {
            self.issues.insert(
                0,
                LocatedIssue {
                    line: None,
                    issue: ParseIssue::MissingModuleTitle,
                },
            );
            return self.failed();
        };

        let mut chapters = Vec::new();
        for chapter in std::mem::take(&mut self.chapters) {
            if chapter.questions.is_empty() {
                self.issues.push(LocatedIssue {
                    line: Some(chapter.line),
                    issue: ParseIssue::EmptyChapter {
                        chapter: chapter.name.clone(),
                    },
                });
            } else {
                chapters.push(chapter);
            }
        }
        if chapters.is_empty() {
            self.issues.push(LocatedIssue {
                line: None,
                issue: ParseIssue::NoValidChapters,
            });
            return self.failed();
        }

        let chapters = self.assign_ids(chapters);
        let module = QuizModule {
            name,
            description: self.description.take(),
            chapters,
        };

        ParseResult {
            success: true,
            quiz_module: Some(module),
            errors: self.issues.iter().map(ToString::to_string).collect(),
        }
    }

    fn failed(self) -> ParseResult {
        ParseResult {
            success: false,
            quiz_module: None,
            errors: self.issues.iter().map(ToString::to_string).collect(),
        }
    }

    /// Fill missing IDs, then rename later duplicates module-wide.
    fn assign_ids(&mut self, chapters: Vec<ChapterBuilder>) -> Vec<Chapter> {
        let mut chapter_ids: Vec<String> = chapters
            .iter()
            .map(|c| c.id.clone().unwrap_or_else(|| generated_chapter_id(c.ordinal, &c.name)))
            .collect();

        let renames = plan_renames(chapter_ids.iter().map(String::as_str));
        for rename in renames {
            let chapter = &chapters[rename.index];
            let first = &chapters[rename.first_index];
            self.issues.push(LocatedIssue {
                line: Some(chapter.line),
                issue: ParseIssue::DuplicateChapterId {
                    id: rename.old_id,
                    chapter: chapter.name.clone(),
                    first_chapter: first.name.clone(),
                    first_line: first.line,
                    new_id: rename.new_id.clone(),
                },
            });
            chapter_ids[rename.index] = rename.new_id;
        }

        let positions: Vec<(usize, usize)> = chapters
            .iter()
            .enumerate()
            .flat_map(|(ci, c)| (0..c.questions.len()).map(move |qi| (ci, qi)))
            .collect();
        let mut question_ids: Vec<String> = positions
            .iter()
            .map(|&(ci, qi)| {
                let parsed = &chapters[ci].questions[qi];
                parsed.declared_id.clone().unwrap_or_else(|| {
                    generated_question_id(chapters[ci].ordinal, parsed.ordinal, &parsed.question.question_text)
                })
            })
            .collect();

        let renames = plan_renames(question_ids.iter().map(String::as_str));
        for rename in renames {
            let (ci, qi) = positions[rename.index];
            let (fci, fqi) = positions[rename.first_index];
            self.issues.push(LocatedIssue {
                line: Some(chapters[ci].questions[qi].line),
                issue: ParseIssue::DuplicateQuestionId {
                    id: rename.old_id,
                    chapter: chapters[ci].name.clone(),
                    first_chapter: chapters[fci].name.clone(),
                    first_line: chapters[fci].questions[fqi].line,
                    new_id: rename.new_id.clone(),
                },
            });
            question_ids[rename.index] = rename.new_id;
        }

        let mut question_ids = question_ids.into_iter();
        chapters
            .into_iter()
            .zip(chapter_ids)
            .map(|(chapter, id)| {
                let questions = chapter
                    .questions
                    .into_iter()
                    .zip(question_ids.by_ref())
                    .map(|(parsed, question_id)| Question {
                        question_id,
                        ..parsed.question
                    })
                    .collect();
                Chapter::new(id, chapter.name, chapter.description, questions)
            })
            .collect()
    }
}

/// A closing fence holds nothing but the opener's marker, repeated at least as often.
fn closes_fence(trimmed: &str, fence: &str) -> bool {
    let marker = fence.chars().next().unwrap_or('`');
    trimmed.starts_with(fence) && trimmed.chars().all(|c| c == marker)
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &text[prefix.len()..])
}

fn generated_chapter_id(ordinal: usize, name: &str) -> String {
    let slug = slug::slugify(name);
    if slug.is_empty() {
        format!("ch{}", ordinal)
    } else {
        format!("ch{}-{}", ordinal, slug)
    }
}

fn generated_question_id(chapter_ordinal: usize, ordinal: usize, text: &str) -> String {
    let mut slug = slug::slugify(short_title(text));
    if slug.len() > QUESTION_SLUG_LEN {
        slug.truncate(QUESTION_SLUG_LEN);
        let trimmed_len = slug.trim_end_matches('-').len();
        slug.truncate(trimmed_len);
    }
    if slug.is_empty() {
        format!("ch{}-q{}", chapter_ordinal, ordinal)
    } else {
        format!("ch{}-q{}-{}", chapter_ordinal, ordinal, slug)
    }
}

/// Whether any parse message carries error severity.
pub fn has_errors(result: &ParseResult) -> bool {
    let tag = Severity::Error.to_string();
    result.errors.iter().any(|e| e.starts_with(&tag))
}
