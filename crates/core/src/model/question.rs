use serde::{Deserialize, Serialize};

use crate::model::ids::{OptionId, QuestionId};

/// One selectable answer of a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub id: OptionId,
    pub content: String,
    pub is_correct: bool,
}

impl AnswerOption {
    #[must_use]
    pub fn new(id: OptionId, content: impl Into<String>, is_correct: bool) -> Self {
        Self {
            id,
            content: content.into(),
            is_correct,
        }
    }
}

/// Multiple-choice question carried by a question section.
///
/// Content authors are expected to mark exactly one option as correct.
/// Nothing here enforces that; `correct_option_count` lets callers check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub prompt: String,
    pub options: Vec<AnswerOption>,
}

impl Question {
    #[must_use]
    pub fn new(id: QuestionId, prompt: impl Into<String>, options: Vec<AnswerOption>) -> Self {
        Self {
            id,
            prompt: prompt.into(),
            options,
        }
    }

    #[must_use]
    pub fn option(&self, id: OptionId) -> Option<&AnswerOption> {
        self.options.iter().find(|o| o.id == id)
    }

    /// Correctness of the given option, or `None` if the option is not part of this question.
    #[must_use]
    pub fn is_correct_option(&self, id: OptionId) -> Option<bool> {
        self.option(id).map(|o| o.is_correct)
    }

    #[must_use]
    pub fn correct_option_count(&self) -> usize {
        self.options.iter().filter(|o| o.is_correct).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question() -> Question {
        Question::new(
            QuestionId::new(10),
            "What is the time complexity of binary search?",
            vec![
                AnswerOption::new(OptionId::new(1), "O(n)", false),
                AnswerOption::new(OptionId::new(2), "O(log n)", true),
            ],
        )
    }

    #[test]
    fn looks_up_option_correctness() {
        let q = question();
        assert_eq!(q.is_correct_option(OptionId::new(2)), Some(true));
        assert_eq!(q.is_correct_option(OptionId::new(1)), Some(false));
        assert_eq!(q.is_correct_option(OptionId::new(99)), None);
    }

    #[test]
    fn counts_correct_options_without_rejecting_malformed_content() {
        let mut q = question();
        assert_eq!(q.correct_option_count(), 1);
        q.options[0].is_correct = true;
        assert_eq!(q.correct_option_count(), 2);
    }
}
