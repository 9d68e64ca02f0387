use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use crate::model::{OptionId, QuestionId, SectionId};
use crate::progress::persisted::{
    PersistedProgress, PersistedQuestionProgress, PersistedSectionProgress,
};

//
// ─── SECTION PROGRESS ──────────────────────────────────────────────────────────
//

/// Viewing state of one section.
///
/// `has_seen` only ever moves from false to true, and `completed_at` is never
/// cleared once stamped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionProgress {
    section_id: SectionId,
    question_id: Option<QuestionId>,
    has_seen: bool,
    seen_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

impl SectionProgress {
    pub(crate) fn unseen(section_id: SectionId, question_id: Option<QuestionId>) -> Self {
        Self {
            section_id,
            question_id,
            has_seen: false,
            seen_at: None,
            completed_at: None,
        }
    }

    pub(crate) fn mark_seen(&mut self, at: Option<DateTime<Utc>>) {
        self.has_seen = true;
        self.seen_at = at;
    }

    pub(crate) fn mark_completed(&mut self, at: Option<DateTime<Utc>>) {
        if self.completed_at.is_none() {
            self.completed_at = at;
        }
    }

    #[must_use]
    pub fn section_id(&self) -> SectionId {
        self.section_id
    }

    /// The question this section carries, for question sections.
    #[must_use]
    pub fn question_id(&self) -> Option<QuestionId> {
        self.question_id
    }

    #[must_use]
    pub fn has_seen(&self) -> bool {
        self.has_seen
    }

    #[must_use]
    pub fn seen_at(&self) -> Option<DateTime<Utc>> {
        self.seen_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }
}

//
// ─── QUESTION PROGRESS ─────────────────────────────────────────────────────────
//

/// Answering state of one question. The first answer is final.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionProgress {
    question_id: QuestionId,
    has_answered: bool,
    selected_option: Option<OptionId>,
    is_correct: bool,
    answered_at: Option<DateTime<Utc>>,
}

impl QuestionProgress {
    pub(crate) fn unanswered(question_id: QuestionId) -> Self {
        Self {
            question_id,
            has_answered: false,
            selected_option: None,
            is_correct: false,
            answered_at: None,
        }
    }

    pub(crate) fn answered(
        question_id: QuestionId,
        selected_option: Option<OptionId>,
        is_correct: bool,
        answered_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            question_id,
            has_answered: true,
            selected_option,
            is_correct,
            answered_at,
        }
    }

    #[must_use]
    pub fn question_id(&self) -> QuestionId {
        self.question_id
    }

    #[must_use]
    pub fn has_answered(&self) -> bool {
        self.has_answered
    }

    #[must_use]
    pub fn selected_option(&self) -> Option<OptionId> {
        self.selected_option
    }

    /// Correctness of the recorded answer; `false` while unanswered.
    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.is_correct
    }

    #[must_use]
    pub fn answered_at(&self) -> Option<DateTime<Utc>> {
        self.answered_at
    }
}

//
// ─── MODULE PROGRESS ───────────────────────────────────────────────────────────
//

/// Session-scoped progress for one module.
///
/// A plain value: tracker operations return a new `ModuleProgress` instead of
/// mutating the one they were given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleProgress {
    pub(crate) sections: BTreeMap<SectionId, SectionProgress>,
    pub(crate) questions: BTreeMap<QuestionId, QuestionProgress>,
}

impl ModuleProgress {
    #[must_use]
    pub fn section(&self, id: SectionId) -> Option<&SectionProgress> {
        self.sections.get(&id)
    }

    #[must_use]
    pub fn question(&self, id: QuestionId) -> Option<&QuestionProgress> {
        self.questions.get(&id)
    }

    pub fn sections(&self) -> impl Iterator<Item = &SectionProgress> {
        self.sections.values()
    }

    pub fn questions(&self) -> impl Iterator<Item = &QuestionProgress> {
        self.questions.values()
    }

    #[must_use]
    pub fn is_seen(&self, id: SectionId) -> bool {
        self.section(id).is_some_and(SectionProgress::has_seen)
    }

    #[must_use]
    pub fn is_answered(&self, id: QuestionId) -> bool {
        self.question(id).is_some_and(QuestionProgress::has_answered)
    }

    /// Number of answered questions whose recorded answer was correct.
    #[must_use]
    pub fn correct_answers(&self) -> usize {
        self.questions
            .values()
            .filter(|q| q.has_answered && q.is_correct)
            .count()
    }

    /// Serialize into the shape handed to the persistence collaborator.
    #[must_use]
    pub fn to_persisted(&self) -> PersistedProgress {
        PersistedProgress {
            sections: self
                .sections
                .values()
                .map(|s| PersistedSectionProgress {
                    section_id: s.section_id,
                    has_seen: s.has_seen,
                    seen_at: s.seen_at,
                    completed_at: s.completed_at,
                })
                .collect(),
            questions: self
                .questions
                .values()
                .map(|q| PersistedQuestionProgress {
                    question_id: q.question_id,
                    has_answered: q.has_answered,
                    option_id: q.selected_option,
                    is_correct: q.is_correct,
                    answered_at: q.answered_at,
                })
                .collect(),
        }
    }
}
