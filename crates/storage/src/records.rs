//! Wire shapes exchanged with the content source.
//!
//! Sections travel as `{id, position, type, content}` where `content` is a
//! kind-specific JSON payload. Unknown `type` values are accepted and decode
//! to `SectionContent::Other`.

use algolearn_core::model::{
    AnswerOption, Module, ModuleId, OptionId, Question, QuestionId, Section, SectionContent,
    SectionId, SectionKind,
};
use serde::{Deserialize, Serialize};

use crate::repository::StorageError;

#[derive(Debug, Serialize, Deserialize)]
struct TextPayload {
    body: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct VideoPayload {
    url: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct CodePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    language: Option<String>,
    code: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OptionPayload {
    id: OptionId,
    content: String,
    #[serde(default)]
    is_correct: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct QuestionPayload {
    id: QuestionId,
    question: String,
    #[serde(default)]
    options: Vec<OptionPayload>,
}

fn payload<T: serde::de::DeserializeOwned>(
    section_id: SectionId,
    content: serde_json::Value,
) -> Result<T, StorageError> {
    serde_json::from_value(content).map_err(|e| {
        StorageError::Serialization(format!("section {section_id}: invalid content: {e}"))
    })
}

fn to_value<T: Serialize>(value: &T) -> Result<serde_json::Value, StorageError> {
    serde_json::to_value(value).map_err(|e| StorageError::Serialization(e.to_string()))
}

/// Persisted/wire shape of a section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionRecord {
    pub id: SectionId,
    pub position: u32,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub content: serde_json::Value,
}

impl SectionRecord {
    /// Build the wire shape of a domain section.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the payload cannot be encoded.
    pub fn from_section(section: &Section) -> Result<Self, StorageError> {
        let content = match &section.content {
            SectionContent::Text { body } => to_value(&TextPayload { body: body.clone() })?,
            SectionContent::Video { url } => to_value(&VideoPayload { url: url.clone() })?,
            SectionContent::Code { language, source } => to_value(&CodePayload {
                language: language.clone(),
                code: source.clone(),
            })?,
            SectionContent::Question(q) => to_value(&QuestionPayload {
                id: q.id,
                question: q.prompt.clone(),
                options: q
                    .options
                    .iter()
                    .map(|o| OptionPayload {
                        id: o.id,
                        content: o.content.clone(),
                        is_correct: o.is_correct,
                    })
                    .collect(),
            })?,
            SectionContent::Other { .. } => serde_json::Value::Null,
        };

        Ok(Self {
            id: section.id,
            position: section.position,
            kind: section.content.wire_kind().to_owned(),
            content,
        })
    }

    /// Decode into a domain section.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the payload of a known kind is malformed.
    pub fn into_section(self) -> Result<Section, StorageError> {
        let id = self.id;
        let content = match SectionKind::parse(&self.kind) {
            SectionKind::Text => {
                let p: TextPayload = payload(id, self.content)?;
                SectionContent::Text { body: p.body }
            }
            SectionKind::Video => {
                let p: VideoPayload = payload(id, self.content)?;
                SectionContent::Video { url: p.url }
            }
            SectionKind::Code => {
                let p: CodePayload = payload(id, self.content)?;
                SectionContent::Code {
                    language: p.language,
                    source: p.code,
                }
            }
            SectionKind::Question => {
                let p: QuestionPayload = payload(id, self.content)?;
                SectionContent::Question(Question::new(
                    p.id,
                    p.question,
                    p.options
                        .into_iter()
                        .map(|o| AnswerOption::new(o.id, o.content, o.is_correct))
                        .collect(),
                ))
            }
            SectionKind::Other => SectionContent::Other { kind: self.kind },
        };

        Ok(Section::new(id, self.position, content))
    }
}

/// Persisted/wire shape of a module with its sections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleRecord {
    pub id: ModuleId,
    pub title: String,
    #[serde(default)]
    pub sections: Vec<SectionRecord>,
}

impl ModuleRecord {
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if a section payload cannot be encoded.
    pub fn from_module(module: &Module) -> Result<Self, StorageError> {
        Ok(Self {
            id: module.id(),
            title: module.title().to_owned(),
            sections: module
                .sections()
                .iter()
                .map(SectionRecord::from_section)
                .collect::<Result<_, _>>()?,
        })
    }

    /// # Errors
    ///
    /// Returns `StorageError::Serialization` for malformed sections or an invalid module.
    pub fn into_module(self) -> Result<Module, StorageError> {
        let sections = self
            .sections
            .into_iter()
            .map(SectionRecord::into_section)
            .collect::<Result<Vec<_>, _>>()?;
        Module::new(self.id, self.title, sections)
            .map_err(|e| StorageError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_question_section_from_wire_json() {
        let raw = r#"{
            "id": 2,
            "position": 2,
            "type": "question",
            "content": {
                "id": 10,
                "question": "Which sort is stable?",
                "options": [
                    {"id": 1, "content": "Quicksort", "isCorrect": false},
                    {"id": 2, "content": "Merge sort", "isCorrect": true}
                ]
            }
        }"#;

        let record: SectionRecord = serde_json::from_str(raw).unwrap();
        let section = record.into_section().unwrap();
        let question = section.as_question().unwrap();
        assert_eq!(question.id, QuestionId::new(10));
        assert_eq!(question.is_correct_option(OptionId::new(2)), Some(true));
    }

    #[test]
    fn unknown_kind_decodes_as_other() {
        let raw = r#"{"id": 4, "position": 4, "type": "diagram", "content": {"svg": "<svg/>"}}"#;
        let record: SectionRecord = serde_json::from_str(raw).unwrap();
        let section = record.into_section().unwrap();
        assert_eq!(section.kind(), SectionKind::Other);
        assert_eq!(section.content.wire_kind(), "diagram");
    }

    #[test]
    fn malformed_known_payload_is_rejected() {
        let record = SectionRecord {
            id: SectionId::new(1),
            position: 1,
            kind: "video".into(),
            content: serde_json::json!({"src": "missing url field"}),
        };
        let err = record.into_section().unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }

    #[test]
    fn code_section_keeps_language() {
        let section = Section::code(SectionId::new(3), 3, Some("rust".into()), "fn main() {}");
        let record = SectionRecord::from_section(&section).unwrap();
        assert_eq!(record.kind, "code");
        assert_eq!(record.content["language"], "rust");
        assert_eq!(record.into_section().unwrap(), section);
    }
}
