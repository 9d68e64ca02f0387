#![forbid(unsafe_code)]

pub mod app_services;
pub mod config;
pub mod error;
pub mod sessions;

pub use algolearn_core::Clock;

pub use app_services::AppServices;
pub use config::AppConfig;
pub use error::{AppServicesError, SessionError};
pub use sessions::{AnswerOutcome, ModuleSession, ModuleSessionService};
