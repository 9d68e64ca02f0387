use thiserror::Error;

use crate::model::ids::{ModuleId, QuestionId, SectionId};
use crate::model::question::Question;
use crate::model::section::Section;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ModuleError {
    #[error("module title cannot be empty")]
    EmptyTitle,
}

//
// ─── MODULE ────────────────────────────────────────────────────────────────────
//

/// An ordered sequence of sections presented to a learner as one lesson.
///
/// Section ids and positions are expected to be unique; the content source
/// owns that guarantee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    id: ModuleId,
    title: String,
    sections: Vec<Section>,
}

impl Module {
    /// Create a module, ordering its sections by position.
    ///
    /// # Errors
    ///
    /// Returns `ModuleError::EmptyTitle` if the title is blank.
    pub fn new(
        id: ModuleId,
        title: impl Into<String>,
        mut sections: Vec<Section>,
    ) -> Result<Self, ModuleError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ModuleError::EmptyTitle);
        }
        sections.sort_by_key(|s| (s.position, s.id));
        Ok(Self {
            id,
            title,
            sections,
        })
    }

    #[must_use]
    pub fn id(&self) -> ModuleId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Sections in traversal order.
    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    #[must_use]
    pub fn section(&self, id: SectionId) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    #[must_use]
    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.sections
            .iter()
            .filter_map(Section::as_question)
            .find(|q| q.id == id)
    }
}
