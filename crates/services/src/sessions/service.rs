use chrono::{DateTime, Utc};

use algolearn_core::model::{LearnerId, Module, ModuleId, OptionId, QuestionId, SectionId};
use algolearn_core::progress::{
    CompletionGate, ModuleProgress, PersistedProgress, ProgressSummary, ProgressTracker,
};

use crate::error::SessionError;

//
// ─── ANSWER OUTCOME ────────────────────────────────────────────────────────────
//

/// Result of answering a question within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub question_id: QuestionId,
    /// The option that counts: the first one chosen in this session.
    pub selected_option: OptionId,
    pub is_correct: bool,
    /// False when the question had already been answered and this attempt was ignored.
    pub accepted: bool,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One learner viewing one module.
///
/// Owns the module content and the current `ModuleProgress`. Every event swaps
/// in the progress value produced by `ProgressTracker`.
#[derive(Debug, Clone)]
pub struct ModuleSession {
    module: Module,
    learner_id: LearnerId,
    progress: ModuleProgress,
    opened_at: DateTime<Utc>,
    resumed: bool,
    submission_id: Option<i64>,
}

impl ModuleSession {
    /// Start a session, seeding progress from a previously persisted snapshot if one exists.
    #[must_use]
    pub fn new(
        module: Module,
        learner_id: LearnerId,
        prior: Option<&PersistedProgress>,
        opened_at: DateTime<Utc>,
    ) -> Self {
        let progress = ProgressTracker::initialize(module.sections(), prior);
        Self {
            module,
            learner_id,
            progress,
            opened_at,
            resumed: prior.is_some_and(|p| !p.is_empty()),
            submission_id: None,
        }
    }

    #[must_use]
    pub fn module(&self) -> &Module {
        &self.module
    }

    #[must_use]
    pub fn module_id(&self) -> ModuleId {
        self.module.id()
    }

    #[must_use]
    pub fn learner_id(&self) -> LearnerId {
        self.learner_id
    }

    #[must_use]
    pub fn progress(&self) -> &ModuleProgress {
        &self.progress
    }

    #[must_use]
    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    /// Whether the session was seeded from prior progress.
    #[must_use]
    pub fn is_resumed(&self) -> bool {
        self.resumed
    }

    #[must_use]
    pub fn submission_id(&self) -> Option<i64> {
        self.submission_id
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.submission_id.is_some()
    }

    #[must_use]
    pub fn summary(&self) -> ProgressSummary {
        ProgressTracker::compute_summary(&self.progress, self.module.sections())
    }

    #[must_use]
    pub fn can_complete(&self) -> CompletionGate {
        ProgressTracker::can_complete(&self.progress, self.module.sections())
    }

    /// Record that a section became visible. Returns true if this was the first sighting.
    pub fn record_section_seen(&mut self, section_id: SectionId, at: DateTime<Utc>) -> bool {
        let was_seen = self.progress.is_seen(section_id);
        self.progress = ProgressTracker::record_section_seen(&self.progress, section_id, at);
        !was_seen && self.progress.is_seen(section_id)
    }

    /// Answer a question, deriving correctness from the module content.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::UnknownQuestion` / `SessionError::UnknownOption` when the
    /// ids do not belong to this module.
    pub fn answer(
        &mut self,
        question_id: QuestionId,
        option_id: OptionId,
        at: DateTime<Utc>,
    ) -> Result<AnswerOutcome, SessionError> {
        let question = self
            .module
            .question(question_id)
            .ok_or(SessionError::UnknownQuestion(question_id))?;
        let is_correct = question
            .is_correct_option(option_id)
            .ok_or(SessionError::UnknownOption {
                question: question_id,
                option: option_id,
            })?;

        if let Some(recorded) = self.progress.question(question_id).filter(|q| q.has_answered()) {
            return Ok(AnswerOutcome {
                question_id,
                selected_option: recorded.selected_option().unwrap_or(option_id),
                is_correct: recorded.is_correct(),
                accepted: false,
            });
        }

        self.progress =
            ProgressTracker::record_answer(&self.progress, question_id, option_id, is_correct, at);
        Ok(AnswerOutcome {
            question_id,
            selected_option: option_id,
            is_correct,
            accepted: true,
        })
    }

    pub(crate) fn set_submission_id(&mut self, id: i64) {
        self.submission_id = Some(id);
    }
}
