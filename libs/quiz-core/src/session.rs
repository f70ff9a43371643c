//! Quiz session operations built on the scheduler.
//!
//! Every function returns new values. A module handed in is never mutated,
//! so readers holding the old module never see a half-updated question.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::algorithm::{self, calculate_next_review};
use crate::types::{Chapter, Question, QuestionStatus, QuizModule, ReviewState};

/// Apply one answer to `question`.
///
/// The answer is correct when the selected set equals the correct set.
pub fn record_answer(question: &Question, selected: &[String], now: DateTime<Utc>) -> Question {
    let mut picked: Vec<&str> = selected.iter().map(String::as_str).collect();
    picked.sort_unstable();
    picked.dedup();
    let mut expected: Vec<&str> = question.correct_option_ids.iter().map(String::as_str).collect();
    expected.sort_unstable();
    expected.dedup();
    let was_correct = !picked.is_empty() && picked == expected;

    let mut next = question.with_review_state(calculate_next_review(
        &question.review_state(),
        was_correct,
        now,
    ));
    next.last_selected_option_id = selected.last().cloned();
    next.last_attempted_at = Some(now);

    if !was_correct {
        for id in selected {
            if question.correct_option_ids.contains(id) || !question.has_option(id) {
                continue;
            }
            next.history_of_incorrect_selections.push(id.clone());
            if !next.shown_incorrect_option_ids.contains(id) {
                next.shown_incorrect_option_ids.push(id.clone());
            }
        }
    }

    next
}

/// Apply one answer inside `module`. Returns `None` for an unknown question.
pub fn answer_question(
    module: &QuizModule,
    question_id: &str,
    selected: &[String],
    now: DateTime<Utc>,
) -> Option<QuizModule> {
    module.find_question(question_id)?;

    let chapters = module
        .chapters
        .iter()
        .map(|chapter| {
            if !chapter.questions.iter().any(|q| q.question_id == question_id) {
                return chapter.clone();
            }
            let questions = chapter
                .questions
                .iter()
                .map(|q| {
                    if q.question_id == question_id {
                        record_answer(q, selected, now)
                    } else {
                        q.clone()
                    }
                })
                .collect();
            Chapter::new(
                chapter.id.clone(),
                chapter.name.clone(),
                chapter.description.clone(),
                questions,
            )
        })
        .collect();

    Some(QuizModule {
        chapters,
        ..module.clone()
    })
}

/// Whether `question` belongs in the review queue at `now`.
pub fn is_due(question: &Question, now: DateTime<Utc>) -> bool {
    algorithm::is_due(&question.review_state(), now)
}

/// Questions due for review at `now`, in document order.
pub fn due_questions(module: &QuizModule, now: DateTime<Utc>) -> Vec<&Question> {
    module.questions().filter(|q| is_due(q, now)).collect()
}

/// A copy of `module` with every question back at its initial review state.
pub fn reset_progress(module: &QuizModule) -> QuizModule {
    let chapters = module
        .chapters
        .iter()
        .map(|chapter| {
            let questions = chapter
                .questions
                .iter()
                .map(|q| Question {
                    shown_incorrect_option_ids: Vec::new(),
                    history_of_incorrect_selections: Vec::new(),
                    last_selected_option_id: None,
                    last_attempted_at: None,
                    ..q.with_review_state(ReviewState::default())
                })
                .collect();
            Chapter::new(
                chapter.id.clone(),
                chapter.name.clone(),
                chapter.description.clone(),
                questions,
            )
        })
        .collect();

    QuizModule {
        chapters,
        ..module.clone()
    }
}

/// Progress counts for one chapter or a whole module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressStats {
    pub total_questions: usize,
    pub answered_questions: usize,
    pub correct_answers: usize,
    pub mastered_questions: usize,
    pub due_questions: usize,
}

impl ProgressStats {
    fn add(&mut self, question: &Question, now: DateTime<Utc>) {
        let state = question.review_state();
        self.total_questions += 1;
        if state.status != QuestionStatus::NotAttempted {
            self.answered_questions += 1;
        }
        if state.times_answered_correctly > 0 {
            self.correct_answers += 1;
        }
        if state.status == QuestionStatus::Mastered {
            self.mastered_questions += 1;
        }
        if algorithm::is_due(&state, now) {
            self.due_questions += 1;
        }
    }
}

/// Per-chapter stats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterStats {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub progress: ProgressStats,
}

/// Stats for a module at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleStats {
    pub name: String,
    #[serde(flatten)]
    pub progress: ProgressStats,
    pub chapters: Vec<ChapterStats>,
}

impl ModuleStats {
    pub fn compute(module: &QuizModule, now: DateTime<Utc>) -> Self {
        let mut total = ProgressStats::default();
        let chapters = module
            .chapters
            .iter()
            .map(|chapter| {
                let mut progress = ProgressStats::default();
                for question in &chapter.questions {
                    progress.add(question, now);
                    total.add(question, now);
                }
                ChapterStats {
                    id: chapter.id.clone(),
                    name: chapter.name.clone(),
                    progress,
                }
            })
            .collect();

        Self {
            name: module.name.clone(),
            progress: total,
            chapters,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::{FAILED_INTERVAL_MS, LEARNING_INTERVAL_MS};
    use crate::types::{QuestionType, QuizOption};
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()
    }

    fn question(id: &str) -> Question {
        Question::new(
            id,
            "Pick b",
            vec![
                QuizOption::new("a", "A"),
                QuizOption::new("b", "B"),
                QuizOption::new("c", "C"),
            ],
            vec!["b".to_string()],
            "Because.",
            QuestionType::Mcq,
        )
    }

    fn module() -> QuizModule {
        QuizModule {
            name: "M".to_string(),
            description: None,
            chapters: vec![
                Chapter::new("ch1", "One", None, vec![question("q1"), question("q2")]),
                Chapter::new("ch2", "Two", None, vec![question("q3")]),
            ],
        }
    }

    fn ids(selected: &[&str]) -> Vec<String> {
        selected.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn correct_answer_updates_state() {
        let q = record_answer(&question("q1"), &ids(&["b"]), now());
        assert_eq!(q.status, QuestionStatus::PassedOnce);
        assert_eq!(
            q.next_review_at,
            Some(now() + Duration::milliseconds(LEARNING_INTERVAL_MS))
        );
        assert_eq!(q.last_selected_option_id.as_deref(), Some("b"));
        assert_eq!(q.last_attempted_at, Some(now()));
        assert!(q.history_of_incorrect_selections.is_empty());
    }

    #[test]
    fn wrong_answer_records_history() {
        let first = record_answer(&question("q1"), &ids(&["a"]), now());
        let second = record_answer(&first, &ids(&["a"]), now());
        assert_eq!(second.status, QuestionStatus::Attempted);
        assert_eq!(
            second.next_review_at,
            Some(now() + Duration::milliseconds(FAILED_INTERVAL_MS))
        );
        assert_eq!(second.history_of_incorrect_selections, ids(&["a", "a"]));
        assert_eq!(second.shown_incorrect_option_ids, ids(&["a"]));
        assert_eq!(second.times_answered_incorrectly, 2);
    }

    #[test]
    fn empty_selection_is_wrong() {
        let q = record_answer(&question("q1"), &[], now());
        assert_eq!(q.status, QuestionStatus::Attempted);
        assert_eq!(q.last_selected_option_id, None);
    }

    #[test]
    fn answer_question_is_copy_on_write() {
        let before = module();
        let after = answer_question(&before, "q3", &ids(&["b"]), now()).unwrap();

        assert_eq!(before.chapters[1].questions[0].status, QuestionStatus::NotAttempted);
        assert_eq!(after.chapters[1].questions[0].status, QuestionStatus::PassedOnce);
        assert_eq!(after.chapters[1].answered_questions, 1);
        assert!(after.chapters[1].is_completed);
        assert_eq!(after.chapters[0], before.chapters[0]);
    }

    #[test]
    fn unknown_question_is_none() {
        assert!(answer_question(&module(), "nope", &ids(&["b"]), now()).is_none());
    }

    #[test]
    fn due_queue_and_stats() {
        let m = answer_question(&module(), "q1", &ids(&["b"]), now()).unwrap();
        let m = answer_question(&m, "q1", &ids(&["b"]), now()).unwrap();
        let m = answer_question(&m, "q2", &ids(&["c"]), now()).unwrap();

        let due: Vec<_> = due_questions(&m, now()).iter().map(|q| q.question_id.clone()).collect();
        assert_eq!(due, vec!["q3"]);

        let later = now() + Duration::milliseconds(FAILED_INTERVAL_MS);
        let due: Vec<_> = due_questions(&m, later).iter().map(|q| q.question_id.clone()).collect();
        assert_eq!(due, vec!["q2", "q3"]);

        let stats = ModuleStats::compute(&m, now());
        assert_eq!(
            stats.progress,
            ProgressStats {
                total_questions: 3,
                answered_questions: 2,
                correct_answers: 1,
                mastered_questions: 1,
                due_questions: 1,
            }
        );
        assert_eq!(stats.chapters[0].progress.answered_questions, 2);
    }

    #[test]
    fn reset_clears_progress() {
        let m = answer_question(&module(), "q1", &ids(&["a"]), now()).unwrap();
        let reset = reset_progress(&m);
        assert_eq!(reset, module());
    }
}
