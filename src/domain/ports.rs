use crate::domain::model::{
    Company, CompanyDraft, CompanyId, ContactId, ImportBatch, ImportSummary, RawRow,
};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Persistence seam for company records. Upserts are keyed by the external
/// CRM id; a single write is atomic and concurrent writers are
/// last-write-wins. Reference validity is not enforced here.
#[async_trait]
pub trait CompanyStore: Send + Sync {
    /// Inserts or updates the record keyed by `external_id`. An insert
    /// assigns a fresh id and creation timestamps; an update rewrites the
    /// draft-carried fields, keeps `created_at`, and refreshes `updated_at`.
    async fn upsert(&self, external_id: &str, draft: CompanyDraft) -> Result<CompanyId>;

    async fn get(&self, id: &CompanyId) -> Result<Option<Company>>;

    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<Company>>;

    async fn delete(&self, id: &CompanyId) -> Result<bool>;

    async fn count(&self) -> Result<usize>;
}

/// Resolves an external contact id to the contact's record id. Resolution
/// only: an unknown id is `None`, never an error.
pub trait ContactDirectory: Send + Sync {
    fn resolve(&self, external_id: &str) -> Option<ContactId>;
}

/// Runtime options for one import run.
pub trait ImportOptions: Send + Sync {
    fn company_csv(&self) -> &str;
    fn join_csv(&self) -> Option<&str>;
    fn limit(&self) -> Option<usize>;
    fn dry_run(&self) -> bool;
}

#[async_trait]
pub trait ImportPipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<RawRow>>;
    async fn transform(&self, rows: Vec<RawRow>) -> Result<ImportBatch>;
    async fn load(&self, batch: ImportBatch) -> Result<ImportSummary>;
}
