use std::env;

use algolearn_core::model::LearnerId;

pub const DB_URL_ENV: &str = "ALGOLEARN_DB_URL";
pub const LEARNER_ID_ENV: &str = "ALGOLEARN_LEARNER_ID";
pub const DEFAULT_DB_URL: &str = "sqlite:dev.sqlite3?mode=rwc";

/// Runtime settings for assembling services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_url: String,
    pub learner_id: LearnerId,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_url: DEFAULT_DB_URL.into(),
            learner_id: LearnerId::new(1),
        }
    }
}

impl AppConfig {
    /// Read settings from the environment, falling back to defaults for missing
    /// or unparsable values.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let db_url = lookup(DB_URL_ENV)
            .filter(|value| !value.trim().is_empty())
            .map_or(defaults.db_url, |value| normalize_sqlite_url(&value));
        let learner_id = lookup(LEARNER_ID_ENV)
            .and_then(|value| value.parse::<LearnerId>().ok())
            .unwrap_or(defaults.learner_id);

        Self { db_url, learner_id }
    }
}

/// Accept bare file paths as well as `sqlite:` URLs.
#[must_use]
pub fn normalize_sqlite_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with("sqlite:") {
        trimmed.to_owned()
    } else {
        format!("sqlite:{trimmed}?mode=rwc")
    }
}
