use serde::Serialize;
use thiserror::Error;

use crate::model::{SectionId, SectionKind};

/// Completed/total pair with its percentage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CompletionCount {
    pub completed: usize,
    pub total: usize,
    pub percentage: f64,
}

impl CompletionCount {
    #[must_use]
    pub fn new(completed: usize, total: usize) -> Self {
        Self {
            completed,
            total,
            percentage: percentage(completed, total),
        }
    }
}

/// Per-section line of a summary, in section order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionDetail {
    pub section_id: SectionId,
    pub kind: SectionKind,
    pub requires_answer: bool,
    pub seen: bool,
    pub answered: bool,
    pub completed: bool,
}

/// Derived view of a module's progress.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSummary {
    /// Completed sections over all sections, in `[0, 100]`.
    pub percentage: f64,
    pub sections: CompletionCount,
    /// Answered questions over question sections.
    pub questions: CompletionCount,
    pub details: Vec<SectionDetail>,
}

/// Why the "complete module" action is not available yet.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CompletionBlocker {
    #[error("some questions have been viewed but not answered")]
    UnansweredQuestions,
    #[error("some sections have not been viewed yet")]
    UnseenSections,
}

/// Outcome of the completion gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CompletionGate {
    Allowed,
    Blocked(CompletionBlocker),
}

impl CompletionGate {
    #[must_use]
    pub fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed)
    }

    #[must_use]
    pub fn reason(self) -> Option<CompletionBlocker> {
        match self {
            Self::Allowed => None,
            Self::Blocked(reason) => Some(reason),
        }
    }
}

#[allow(clippy::cast_precision_loss)]
pub(crate) fn percentage(completed: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let ratio = completed.min(total) as f64 / total as f64;
    ratio * 100.0
}
