use crate::core::{ImportPipeline, ImportSummary};
use crate::utils::error::Result;

/// Drives one import run through extract, transform, and load.
pub struct ImportEngine<P: ImportPipeline> {
    pipeline: P,
}

impl<P: ImportPipeline> ImportEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<ImportSummary> {
        tracing::info!("Extracting company rows...");
        let rows = self.pipeline.extract().await?;
        tracing::info!("Extracted {} rows", rows.len());

        tracing::info!("Transforming rows...");
        let batch = self.pipeline.transform(rows).await?;
        tracing::info!(
            "Prepared {} upserts, {} rows skipped",
            batch.upserts.len(),
            batch.skipped
        );

        tracing::info!("Loading into store...");
        let summary = self.pipeline.load(batch).await?;
        tracing::info!(
            "Import finished: {} upserted, {} skipped",
            summary.upserted,
            summary.skipped
        );

        Ok(summary)
    }
}
