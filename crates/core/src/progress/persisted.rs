use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{OptionId, QuestionId, SectionId};

/// Progress snapshot exchanged with the persistence collaborator.
///
/// Used both to seed a resumed session and to submit a completed one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedProgress {
    #[serde(default)]
    pub sections: Vec<PersistedSectionProgress>,
    #[serde(default)]
    pub questions: Vec<PersistedQuestionProgress>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSectionProgress {
    pub section_id: SectionId,
    pub has_seen: bool,
    #[serde(default)]
    pub seen_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedQuestionProgress {
    pub question_id: QuestionId,
    pub has_answered: bool,
    #[serde(default)]
    pub option_id: Option<OptionId>,
    #[serde(default)]
    pub is_correct: bool,
    #[serde(default)]
    pub answered_at: Option<DateTime<Utc>>,
}

impl PersistedProgress {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty() && self.questions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_camel_case_snapshot_with_missing_optionals() {
        let raw = r#"{
            "sections": [
                {"sectionId": 1, "hasSeen": true, "seenAt": "2023-11-14T22:13:20Z"}
            ],
            "questions": [
                {"questionId": 10, "hasAnswered": false}
            ]
        }"#;

        let parsed: PersistedProgress = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.sections.len(), 1);
        assert!(parsed.sections[0].has_seen);
        assert!(parsed.sections[0].completed_at.is_none());
        assert_eq!(parsed.questions[0].question_id, QuestionId::new(10));
        assert!(parsed.questions[0].option_id.is_none());
    }

    #[test]
    fn empty_object_is_an_empty_snapshot() {
        let parsed: PersistedProgress = serde_json::from_str("{}").unwrap();
        assert!(parsed.is_empty());
    }
}
