pub mod company_pipeline;
pub mod engine;

pub use crate::domain::model::{ImportBatch, ImportSummary, RawRow};
pub use crate::domain::ports::{CompanyStore, ContactDirectory, ImportOptions, ImportPipeline};
pub use crate::utils::error::Result;
