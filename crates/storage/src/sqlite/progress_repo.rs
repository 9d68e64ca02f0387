use algolearn_core::model::{LearnerId, ModuleId};
use algolearn_core::progress::PersistedProgress;

use super::SqliteRepository;
use super::mapping::{
    conn, id_to_i64, map_completion_row, map_question_progress_row, map_section_progress_row,
};
use crate::repository::{CompletionRow, ProgressRepository, ProgressSubmission, StorageError};

#[async_trait::async_trait]
impl ProgressRepository for SqliteRepository {
    async fn load_progress(
        &self,
        module_id: ModuleId,
        learner_id: LearnerId,
    ) -> Result<Option<PersistedProgress>, StorageError> {
        let module = id_to_i64("module_id", module_id.value())?;
        let learner = id_to_i64("learner_id", learner_id.value())?;

        let section_rows = sqlx::query(
            r"
            SELECT section_id, has_seen, seen_at, completed_at
            FROM section_progress
            WHERE module_id = ?1 AND learner_id = ?2
            ORDER BY section_id ASC
            ",
        )
        .bind(module)
        .bind(learner)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let question_rows = sqlx::query(
            r"
            SELECT question_id, has_answered, option_id, is_correct, answered_at
            FROM question_progress
            WHERE module_id = ?1 AND learner_id = ?2
            ORDER BY question_id ASC
            ",
        )
        .bind(module)
        .bind(learner)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        if section_rows.is_empty() && question_rows.is_empty() {
            return Ok(None);
        }

        let mut progress = PersistedProgress::default();
        for row in &section_rows {
            progress.sections.push(map_section_progress_row(row)?);
        }
        for row in &question_rows {
            progress.questions.push(map_question_progress_row(row)?);
        }
        Ok(Some(progress))
    }

    async fn submit_progress(&self, submission: &ProgressSubmission) -> Result<i64, StorageError> {
        let module = id_to_i64("module_id", submission.module_id.value())?;
        let learner = id_to_i64("learner_id", submission.learner_id.value())?;
        let mut tx = self.pool.begin().await.map_err(conn)?;

        sqlx::query("DELETE FROM section_progress WHERE module_id = ?1 AND learner_id = ?2")
            .bind(module)
            .bind(learner)
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        sqlx::query("DELETE FROM question_progress WHERE module_id = ?1 AND learner_id = ?2")
            .bind(module)
            .bind(learner)
            .execute(&mut *tx)
            .await
            .map_err(conn)?;

        for section in &submission.progress.sections {
            sqlx::query(
                r"
                INSERT INTO section_progress (
                    module_id, learner_id, section_id, has_seen, seen_at, completed_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(module_id, learner_id, section_id) DO UPDATE SET
                    has_seen = MAX(has_seen, excluded.has_seen),
                    seen_at = COALESCE(seen_at, excluded.seen_at),
                    completed_at = COALESCE(completed_at, excluded.completed_at)
                ",
            )
            .bind(module)
            .bind(learner)
            .bind(id_to_i64("section_id", section.section_id.value())?)
            .bind(section.has_seen)
            .bind(section.seen_at)
            .bind(section.completed_at)
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        }

        for question in &submission.progress.questions {
            let option_id = question
                .option_id
                .map(|o| id_to_i64("option_id", o.value()))
                .transpose()?;
            sqlx::query(
                r"
                INSERT INTO question_progress (
                    module_id, learner_id, question_id, has_answered, option_id,
                    is_correct, answered_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                ON CONFLICT(module_id, learner_id, question_id) DO NOTHING
                ",
            )
            .bind(module)
            .bind(learner)
            .bind(id_to_i64("question_id", question.question_id.value())?)
            .bind(question.has_answered)
            .bind(option_id)
            .bind(question.is_correct)
            .bind(question.answered_at)
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        }

        let res = sqlx::query(
            r"
            INSERT INTO module_completions (module_id, learner_id, completed_at)
            VALUES (?1, ?2, ?3)
            ",
        )
        .bind(module)
        .bind(learner)
        .bind(submission.completed_at)
        .execute(&mut *tx)
        .await
        .map_err(conn)?;

        tx.commit().await.map_err(conn)?;
        let id = res.last_insert_rowid();
        tracing::debug!(
            completion_id = id,
            module_id = %submission.module_id,
            learner_id = %submission.learner_id,
            "stored module completion"
        );
        Ok(id)
    }

    async fn list_completions(
        &self,
        module_id: ModuleId,
        learner_id: LearnerId,
    ) -> Result<Vec<CompletionRow>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, module_id, learner_id, completed_at
            FROM module_completions
            WHERE module_id = ?1 AND learner_id = ?2
            ORDER BY completed_at DESC, id DESC
            ",
        )
        .bind(id_to_i64("module_id", module_id.value())?)
        .bind(id_to_i64("learner_id", learner_id.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            out.push(map_completion_row(row)?);
        }
        Ok(out)
    }
}
