#![forbid(unsafe_code)]

pub mod records;
pub mod repository;
pub mod sqlite;

pub use records::{ModuleRecord, SectionRecord};
pub use repository::{
    CompletionRow, InMemoryRepository, ModuleListing, ModuleRepository, ProgressRepository,
    ProgressSubmission, Storage, StorageError,
};
