use serde::{Deserialize, Serialize};

use crate::model::ids::{QuestionId, SectionId};
use crate::model::question::Question;

//
// ─── SECTION KIND ──────────────────────────────────────────────────────────────
//

/// Discriminant of a section's content.
///
/// Unknown kinds coming from the content source map to `Other` and are
/// tracked with plain (non-question) semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Text,
    Video,
    Code,
    Question,
    Other,
}

impl SectionKind {
    /// Parses a wire kind. Never fails.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "text" => Self::Text,
            "video" => Self::Video,
            "code" => Self::Code,
            "question" => Self::Question,
            _ => Self::Other,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Video => "video",
            Self::Code => "code",
            Self::Question => "question",
            Self::Other => "other",
        }
    }

    /// Whether completing a section of this kind needs an answer on top of being seen.
    #[must_use]
    pub fn requires_answer(self) -> bool {
        matches!(self, Self::Question)
    }
}

//
// ─── SECTION CONTENT ───────────────────────────────────────────────────────────
//

/// Kind-specific payload of a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SectionContent {
    Text { body: String },
    Video { url: String },
    Code { language: Option<String>, source: String },
    Question(Question),
    /// Content of a kind this crate does not know; the raw kind is kept for round-tripping.
    Other { kind: String },
}

impl SectionContent {
    #[must_use]
    pub fn kind(&self) -> SectionKind {
        match self {
            Self::Text { .. } => SectionKind::Text,
            Self::Video { .. } => SectionKind::Video,
            Self::Code { .. } => SectionKind::Code,
            Self::Question(_) => SectionKind::Question,
            Self::Other { .. } => SectionKind::Other,
        }
    }

    /// The kind string used on the wire; unknown kinds keep their original value.
    #[must_use]
    pub fn wire_kind(&self) -> &str {
        match self {
            Self::Other { kind } => kind,
            other => other.kind().as_str(),
        }
    }
}

//
// ─── SECTION ───────────────────────────────────────────────────────────────────
//

/// One positioned unit of module content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: SectionId,
    pub position: u32,
    pub content: SectionContent,
}

impl Section {
    #[must_use]
    pub fn new(id: SectionId, position: u32, content: SectionContent) -> Self {
        Self {
            id,
            position,
            content,
        }
    }

    #[must_use]
    pub fn text(id: SectionId, position: u32, body: impl Into<String>) -> Self {
        Self::new(id, position, SectionContent::Text { body: body.into() })
    }

    #[must_use]
    pub fn video(id: SectionId, position: u32, url: impl Into<String>) -> Self {
        Self::new(id, position, SectionContent::Video { url: url.into() })
    }

    #[must_use]
    pub fn code(
        id: SectionId,
        position: u32,
        language: Option<String>,
        source: impl Into<String>,
    ) -> Self {
        Self::new(
            id,
            position,
            SectionContent::Code {
                language,
                source: source.into(),
            },
        )
    }

    #[must_use]
    pub fn question(id: SectionId, position: u32, question: Question) -> Self {
        Self::new(id, position, SectionContent::Question(question))
    }

    #[must_use]
    pub fn kind(&self) -> SectionKind {
        self.content.kind()
    }

    #[must_use]
    pub fn requires_answer(&self) -> bool {
        self.kind().requires_answer()
    }

    #[must_use]
    pub fn as_question(&self) -> Option<&Question> {
        match &self.content {
            SectionContent::Question(q) => Some(q),
            _ => None,
        }
    }

    #[must_use]
    pub fn question_id(&self) -> Option<QuestionId> {
        self.as_question().map(|q| q.id)
    }
}
