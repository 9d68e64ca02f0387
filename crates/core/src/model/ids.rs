use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for parsing an ID from a string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to parse {kind} from string")]
pub struct ParseIdError {
    kind: &'static str,
}

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(u64);

        impl $name {
            #[must_use]
            pub fn new(id: u64) -> Self {
                Self(id)
            }

            /// Returns the underlying u64 value
            #[must_use]
            pub fn value(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<u64>().map($name::new).map_err(|_| ParseIdError {
                    kind: stringify!($name),
                })
            }
        }
    };
}

numeric_id!(
    /// Unique identifier for a learning module.
    ModuleId
);
numeric_id!(
    /// Unique identifier for a section within a module.
    SectionId
);
numeric_id!(
    /// Unique identifier for a question carried by a question section.
    QuestionId
);
numeric_id!(
    /// Unique identifier for an answer option of a question.
    OptionId
);
numeric_id!(
    /// Unique identifier for the learner who owns a module session.
    LearnerId
);

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_id_display() {
        assert_eq!(SectionId::new(42).to_string(), "42");
        assert_eq!(format!("{:?}", SectionId::new(42)), "SectionId(42)");
    }

    #[test]
    fn question_id_from_str() {
        let id: QuestionId = " 10 ".parse().unwrap();
        assert_eq!(id, QuestionId::new(10));
    }

    #[test]
    fn invalid_id_names_the_kind() {
        let err = "abc".parse::<OptionId>().unwrap_err();
        assert_eq!(err.to_string(), "failed to parse OptionId from string");
    }

    #[test]
    fn ids_serialize_as_plain_numbers() {
        let json = serde_json::to_string(&ModuleId::new(7)).unwrap();
        assert_eq!(json, "7");
        let back: LearnerId = serde_json::from_str("3").unwrap();
        assert_eq!(back, LearnerId::new(3));
    }
}
