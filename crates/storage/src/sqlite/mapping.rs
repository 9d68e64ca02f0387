use algolearn_core::model::{LearnerId, ModuleId, OptionId, QuestionId, Section, SectionId};
use algolearn_core::progress::{PersistedQuestionProgress, PersistedSectionProgress};
use sqlx::Row;

use crate::records::SectionRecord;
use crate::repository::{CompletionRow, StorageError};

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

/// Ids are `u64` in the domain and `INTEGER` (i64) in `SQLite`.
pub(crate) fn id_to_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

pub(crate) fn module_id_from_i64(v: i64) -> Result<ModuleId, StorageError> {
    Ok(ModuleId::new(i64_to_u64("module_id", v)?))
}

pub(crate) fn learner_id_from_i64(v: i64) -> Result<LearnerId, StorageError> {
    Ok(LearnerId::new(i64_to_u64("learner_id", v)?))
}

fn section_id_from_i64(v: i64) -> Result<SectionId, StorageError> {
    Ok(SectionId::new(i64_to_u64("section_id", v)?))
}

fn question_id_from_i64(v: i64) -> Result<QuestionId, StorageError> {
    Ok(QuestionId::new(i64_to_u64("question_id", v)?))
}

fn option_id_from_i64(v: i64) -> Result<OptionId, StorageError> {
    Ok(OptionId::new(i64_to_u64("option_id", v)?))
}

pub(crate) fn map_section_row(row: &sqlx::sqlite::SqliteRow) -> Result<Section, StorageError> {
    let position: i64 = row.try_get("position").map_err(ser)?;
    let content: String = row.try_get("content").map_err(ser)?;
    let record = SectionRecord {
        id: section_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        position: u32::try_from(position)
            .map_err(|_| StorageError::Serialization(format!("invalid position: {position}")))?,
        kind: row.try_get("kind").map_err(ser)?,
        content: serde_json::from_str(&content).map_err(ser)?,
    };
    record.into_section()
}

pub(crate) fn map_section_progress_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<PersistedSectionProgress, StorageError> {
    Ok(PersistedSectionProgress {
        section_id: section_id_from_i64(row.try_get::<i64, _>("section_id").map_err(ser)?)?,
        has_seen: row.try_get("has_seen").map_err(ser)?,
        seen_at: row.try_get("seen_at").map_err(ser)?,
        completed_at: row.try_get("completed_at").map_err(ser)?,
    })
}

pub(crate) fn map_question_progress_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<PersistedQuestionProgress, StorageError> {
    Ok(PersistedQuestionProgress {
        question_id: question_id_from_i64(row.try_get::<i64, _>("question_id").map_err(ser)?)?,
        has_answered: row.try_get("has_answered").map_err(ser)?,
        option_id: row
            .try_get::<Option<i64>, _>("option_id")
            .map_err(ser)?
            .map(option_id_from_i64)
            .transpose()?,
        is_correct: row.try_get("is_correct").map_err(ser)?,
        answered_at: row.try_get("answered_at").map_err(ser)?,
    })
}

pub(crate) fn map_completion_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<CompletionRow, StorageError> {
    Ok(CompletionRow {
        id: row.try_get("id").map_err(ser)?,
        module_id: module_id_from_i64(row.try_get::<i64, _>("module_id").map_err(ser)?)?,
        learner_id: learner_id_from_i64(row.try_get::<i64, _>("learner_id").map_err(ser)?)?,
        completed_at: row.try_get("completed_at").map_err(ser)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_ids_are_rejected() {
        assert!(module_id_from_i64(-1).is_err());
        assert_eq!(module_id_from_i64(7).unwrap(), ModuleId::new(7));
    }

    #[test]
    fn oversized_ids_are_rejected() {
        assert!(id_to_i64("section_id", u64::MAX).is_err());
        assert_eq!(id_to_i64("section_id", 12).unwrap(), 12);
    }
}
