use async_trait::async_trait;
use chrono::{DateTime, Utc};
use algolearn_core::model::{LearnerId, Module, ModuleId};
use algolearn_core::progress::PersistedProgress;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Lightweight module listing entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleListing {
    pub id: ModuleId,
    pub title: String,
    pub section_count: u32,
}

/// Progress handed over when a learner completes a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressSubmission {
    pub module_id: ModuleId,
    pub learner_id: LearnerId,
    pub completed_at: DateTime<Utc>,
    pub progress: PersistedProgress,
}

/// One recorded module completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRow {
    pub id: i64,
    pub module_id: ModuleId,
    pub learner_id: LearnerId,
    pub completed_at: DateTime<Utc>,
}

/// Content source: supplies modules and their ordered sections.
#[async_trait]
pub trait ModuleRepository: Send + Sync {
    /// Persist or replace a module together with its sections.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the module cannot be stored.
    async fn upsert_module(&self, module: &Module) -> Result<(), StorageError>;

    /// Fetch a module by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_module(&self, id: ModuleId) -> Result<Module, StorageError>;

    /// List modules ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn list_modules(&self, limit: u32) -> Result<Vec<ModuleListing>, StorageError>;
}

/// Persistence collaborator: remembers learner progress across sessions.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Load the last submitted progress for a learner, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn load_progress(
        &self,
        module_id: ModuleId,
        learner_id: LearnerId,
    ) -> Result<Option<PersistedProgress>, StorageError>;

    /// Store the submitted progress and record a completion. Returns the completion id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the submission cannot be stored.
    async fn submit_progress(&self, submission: &ProgressSubmission) -> Result<i64, StorageError>;

    /// Completions for a learner and module, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn list_completions(
        &self,
        module_id: ModuleId,
        learner_id: LearnerId,
    ) -> Result<Vec<CompletionRow>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    modules: Arc<Mutex<HashMap<ModuleId, Module>>>,
    progress: Arc<Mutex<HashMap<(ModuleId, LearnerId), PersistedProgress>>>,
    completions: Arc<Mutex<Vec<CompletionRow>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl ModuleRepository for InMemoryRepository {
    async fn upsert_module(&self, module: &Module) -> Result<(), StorageError> {
        let mut guard = self.modules.lock().map_err(poisoned)?;
        guard.insert(module.id(), module.clone());
        Ok(())
    }

    async fn get_module(&self, id: ModuleId) -> Result<Module, StorageError> {
        let guard = self.modules.lock().map_err(poisoned)?;
        guard.get(&id).cloned().ok_or(StorageError::NotFound)
    }

    async fn list_modules(&self, limit: u32) -> Result<Vec<ModuleListing>, StorageError> {
        let guard = self.modules.lock().map_err(poisoned)?;
        let mut listings: Vec<ModuleListing> = guard
            .values()
            .map(|m| ModuleListing {
                id: m.id(),
                title: m.title().to_owned(),
                section_count: u32::try_from(m.sections().len()).unwrap_or(u32::MAX),
            })
            .collect();
        listings.sort_by_key(|l| l.id);
        listings.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(listings)
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn load_progress(
        &self,
        module_id: ModuleId,
        learner_id: LearnerId,
    ) -> Result<Option<PersistedProgress>, StorageError> {
        let guard = self.progress.lock().map_err(poisoned)?;
        Ok(guard.get(&(module_id, learner_id)).cloned())
    }

    async fn submit_progress(&self, submission: &ProgressSubmission) -> Result<i64, StorageError> {
        {
            let mut guard = self.progress.lock().map_err(poisoned)?;
            guard.insert(
                (submission.module_id, submission.learner_id),
                submission.progress.clone(),
            );
        }
        let mut completions = self.completions.lock().map_err(poisoned)?;
        let id = i64::try_from(completions.len() + 1)
            .map_err(|_| StorageError::Serialization("completion id overflow".into()))?;
        completions.push(CompletionRow {
            id,
            module_id: submission.module_id,
            learner_id: submission.learner_id,
            completed_at: submission.completed_at,
        });
        Ok(id)
    }

    async fn list_completions(
        &self,
        module_id: ModuleId,
        learner_id: LearnerId,
    ) -> Result<Vec<CompletionRow>, StorageError> {
        let guard = self.completions.lock().map_err(poisoned)?;
        let mut rows: Vec<CompletionRow> = guard
            .iter()
            .filter(|c| c.module_id == module_id && c.learner_id == learner_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.completed_at.cmp(&a.completed_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }
}

/// Aggregates the content source and the persistence collaborator behind trait objects.
#[derive(Clone)]
pub struct Storage {
    pub modules: Arc<dyn ModuleRepository>,
    pub progress: Arc<dyn ProgressRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let modules: Arc<dyn ModuleRepository> = Arc::new(repo.clone());
        let progress: Arc<dyn ProgressRepository> = Arc::new(repo);
        Self { modules, progress }
    }
}
