pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{Cli, Command};

pub use adapters::{http::OpenSecretsClient, storage::FileStore};
pub use app::{CandidateView, LegislatorsView, Route};
pub use config::AppConfig;
pub use utils::error::{AppError, Result};
