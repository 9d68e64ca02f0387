mod ids;
mod module;
mod question;
mod section;

pub use ids::{LearnerId, ModuleId, OptionId, ParseIdError, QuestionId, SectionId};

pub use module::{Module, ModuleError};
pub use question::{AnswerOption, Question};
pub use section::{Section, SectionContent, SectionKind};
