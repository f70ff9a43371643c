//! Normalization of structurally valid modules.
//!
//! Missing review fields are already defaulted when a module is decoded, so
//! this pass clamps untrusted levels, renames duplicate IDs across the whole
//! module, and recomputes chapter counters. The input is never modified and
//! running the pass on its own output changes nothing.

use tracing::warn;

use crate::algorithm::clamp_srs_level;
use crate::dedup::{deduplicate, plan_renames};
use crate::error::NormalizeWarning;
use crate::types::{Chapter, Question, QuizModule};

/// A normalized module plus the repairs made to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub module: QuizModule,
    pub warnings: Vec<String>,
}

/// Normalize `module`, returning a new value.
pub fn normalize(module: &QuizModule) -> Normalized {
    let mut warnings = Vec::new();

    let (mut chapters, renames) = deduplicate(
        &module.chapters,
        |c| c.id.as_str(),
        |c, id| Chapter {
            id: id.to_string(),
            ..c.clone()
        },
    );
    for rename in renames {
        let warning = NormalizeWarning::DuplicateChapterId {
            id: rename.old_id,
            chapter: module.chapters[rename.index].name.clone(),
            first_chapter: module.chapters[rename.first_index].name.clone(),
            new_id: rename.new_id,
        };
        warn!(%warning, "auto-fixed chapter id");
        warnings.push(warning.to_string());
    }

    dedupe_question_ids(&mut chapters, &mut warnings);

    for chapter in &mut chapters {
        for question in &mut chapter.questions {
            question.srs_level = clamp_srs_level(question.srs_level as f64);
        }
        chapter.recompute_counters();
    }

    Normalized {
        module: QuizModule {
            name: module.name.clone(),
            description: module.description.clone(),
            chapters,
        },
        warnings,
    }
}

/// Question IDs must be unique across chapters, not only within one.
fn dedupe_question_ids(chapters: &mut [Chapter], warnings: &mut Vec<String>) {
    let positions: Vec<(usize, usize)> = chapters
        .iter()
        .enumerate()
        .flat_map(|(ci, c)| (0..c.questions.len()).map(move |qi| (ci, qi)))
        .collect();

    let view: &[Chapter] = chapters;
    let renames = plan_renames(
        positions
            .iter()
            .map(move |&(ci, qi)| view[ci].questions[qi].question_id.as_str()),
    );

    for rename in renames {
        let (ci, qi) = positions[rename.index];
        let (fci, _) = positions[rename.first_index];
        let warning = NormalizeWarning::DuplicateQuestionId {
            id: rename.old_id,
            chapter: chapters[ci].name.clone(),
            first_chapter: chapters[fci].name.clone(),
            new_id: rename.new_id.clone(),
        };
        warn!(%warning, "auto-fixed question id");
        warnings.push(warning.to_string());

        let question = &mut chapters[ci].questions[qi];
        *question = Question {
            question_id: rename.new_id,
            ..question.clone()
        };
    }
}
