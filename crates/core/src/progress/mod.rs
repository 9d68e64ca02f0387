mod persisted;
mod state;
mod summary;
mod tracker;

pub use persisted::{PersistedProgress, PersistedQuestionProgress, PersistedSectionProgress};
pub use state::{ModuleProgress, QuestionProgress, SectionProgress};
pub use summary::{
    CompletionBlocker, CompletionCount, CompletionGate, ProgressSummary, SectionDetail,
};
pub use tracker::ProgressTracker;
