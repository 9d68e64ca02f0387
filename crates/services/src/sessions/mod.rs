mod service;
mod workflow;

// Public API of the module session subsystem.
pub use crate::error::SessionError;
pub use service::{AnswerOutcome, ModuleSession};
pub use workflow::ModuleSessionService;
