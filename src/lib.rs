pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::ImportConfig;

pub use adapters::directory::MemoryDirectory;
pub use adapters::store::{JsonStore, MemoryStore};
pub use crate::core::{company_pipeline::CompanyPipeline, engine::ImportEngine};
pub use domain::model::{
    Address, Company, CompanyDraft, CompanyId, CompanyMeta, ContactId, ImportSummary, UserId,
};
pub use utils::error::{ImportError, Result};
