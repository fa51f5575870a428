use clap::Parser;
use crm_import::adapters::directory::{self, MemoryDirectory};
use crm_import::utils::{logger, validation::Validate};
use crm_import::{CliConfig, CompanyPipeline, ImportConfig, ImportEngine, JsonStore};
use std::collections::HashMap;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting crm-import CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // The TOML config, when given, supplies paths and the owner mapping table.
    let mut owners = HashMap::new();
    if let Some(path) = config.config.clone() {
        match ImportConfig::from_file(&path) {
            Ok(import_config) => {
                owners = import_config.owner_map();
                config.company_csv = import_config.paths.company_csv;
                config.join_csv = import_config.paths.company_join_csv;
                config.contacts_json = import_config.paths.contacts_json;
                config.store_path = import_config.paths.store;
            }
            Err(e) => {
                tracing::error!("Failed to load import config {}: {}", path, e);
                eprintln!("❌ {}", e);
                std::process::exit(1);
            }
        }
    }

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let directory = match &config.contacts_json {
        Some(path) => {
            tracing::info!("Preloading contacts from: {}", path);
            let directory = directory::load_directory(path)?;
            tracing::info!("Loaded {} contacts", directory.len());
            directory
        }
        None => MemoryDirectory::new(),
    };

    let store = JsonStore::open(&config.store_path)?;
    let dry_run = config.dry_run;
    let pipeline = CompanyPipeline::new(store, directory, config).with_owners(owners);
    let engine = ImportEngine::new(pipeline);

    match engine.run().await {
        Ok(summary) => {
            if dry_run {
                println!(
                    "🧪 Dry run: {} upserts prepared, {} rows skipped",
                    summary.prepared, summary.skipped
                );
            } else {
                println!(
                    "✅ Import complete: {} companies upserted, {} rows skipped",
                    summary.upserted, summary.skipped
                );
            }
        }
        Err(e) => {
            tracing::error!("Import failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
