use std::sync::Arc;

use algolearn_core::model::{LearnerId, ModuleId, OptionId, QuestionId, SectionId};
use algolearn_core::progress::{CompletionGate, ProgressSummary};
use storage::repository::{ModuleRepository, ProgressRepository, ProgressSubmission};

use super::service::{AnswerOutcome, ModuleSession};
use crate::Clock;
use crate::error::SessionError;

/// Orchestrates module sessions over the content source and the persistence collaborator.
///
/// Events are stamped with the service clock; progress is submitted once, when
/// the learner completes the module.
#[derive(Clone)]
pub struct ModuleSessionService {
    clock: Clock,
    modules: Arc<dyn ModuleRepository>,
    progress: Arc<dyn ProgressRepository>,
}

impl ModuleSessionService {
    #[must_use]
    pub fn new(
        clock: Clock,
        modules: Arc<dyn ModuleRepository>,
        progress: Arc<dyn ProgressRepository>,
    ) -> Self {
        Self {
            clock,
            modules,
            progress,
        }
    }

    /// Open a module for a learner, resuming any previously submitted progress.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the module is missing or storage fails.
    pub async fn open(
        &self,
        module_id: ModuleId,
        learner_id: LearnerId,
    ) -> Result<ModuleSession, SessionError> {
        let module = self.modules.get_module(module_id).await?;
        let prior = self.progress.load_progress(module_id, learner_id).await?;
        let session = ModuleSession::new(module, learner_id, prior.as_ref(), self.clock.now());

        tracing::info!(
            %module_id,
            %learner_id,
            sections = session.module().sections().len(),
            resumed = session.is_resumed(),
            "opened module session"
        );
        Ok(session)
    }

    /// Record that a section scrolled into view.
    pub fn record_section_seen(&self, session: &mut ModuleSession, section_id: SectionId) -> bool {
        let first = session.record_section_seen(section_id, self.clock.now());
        if first {
            tracing::debug!(module_id = %session.module_id(), %section_id, "section seen");
        } else if session.module().section(section_id).is_none() {
            tracing::debug!(module_id = %session.module_id(), %section_id, "ignoring unknown section");
        }
        first
    }

    /// Answer a question. Only the first answer per question counts.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::UnknownQuestion` or `SessionError::UnknownOption` for ids
    /// outside the module.
    pub fn answer(
        &self,
        session: &mut ModuleSession,
        question_id: QuestionId,
        option_id: OptionId,
    ) -> Result<AnswerOutcome, SessionError> {
        if let Some(question) = session.module().question(question_id) {
            let correct = question.correct_option_count();
            if correct != 1 {
                tracing::warn!(
                    module_id = %session.module_id(),
                    %question_id,
                    correct,
                    "question does not have exactly one correct option"
                );
            }
        }

        let outcome = session.answer(question_id, option_id, self.clock.now())?;
        if outcome.accepted {
            tracing::debug!(
                module_id = %session.module_id(),
                %question_id,
                %option_id,
                is_correct = outcome.is_correct,
                "answer recorded"
            );
        } else {
            tracing::debug!(
                module_id = %session.module_id(),
                %question_id,
                "question already answered, ignoring repeat"
            );
        }
        Ok(outcome)
    }

    #[must_use]
    pub fn summary(&self, session: &ModuleSession) -> ProgressSummary {
        session.summary()
    }

    #[must_use]
    pub fn can_complete(&self, session: &ModuleSession) -> CompletionGate {
        session.can_complete()
    }

    /// Submit the session's progress as a completed module.
    ///
    /// Submission happens once; later calls return the stored completion id.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Incomplete` while the completion gate is closed, or
    /// `SessionError::Storage` if persisting fails.
    pub async fn complete(&self, session: &mut ModuleSession) -> Result<i64, SessionError> {
        if let Some(id) = session.submission_id() {
            return Ok(id);
        }

        if let CompletionGate::Blocked(reason) = session.can_complete() {
            tracing::info!(module_id = %session.module_id(), %reason, "completion refused");
            return Err(SessionError::Incomplete(reason));
        }

        let submission = ProgressSubmission {
            module_id: session.module_id(),
            learner_id: session.learner_id(),
            completed_at: self.clock.now(),
            progress: session.progress().to_persisted(),
        };
        let id = self.progress.submit_progress(&submission).await?;
        session.set_submission_id(id);

        tracing::info!(
            module_id = %submission.module_id,
            learner_id = %submission.learner_id,
            completion_id = id,
            elapsed_secs = (submission.completed_at - session.opened_at()).num_seconds(),
            correct_answers = session.progress().correct_answers(),
            "module completed"
        );
        Ok(id)
    }
}
