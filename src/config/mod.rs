pub mod import_config;

pub use import_config::ImportConfig;

#[cfg(feature = "cli")]
mod cli {
    use crate::domain::ports::ImportOptions;
    use crate::utils::error::Result;
    use crate::utils::validation::{validate_file_extension, validate_path, Validate};
    use clap::Parser;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize, Parser)]
    #[command(name = "crm-import")]
    #[command(about = "Import HubSpot company CSV exports into the CRM store")]
    pub struct CliConfig {
        /// Company CSV export
        #[arg(long, default_value = "./data/Company.csv")]
        pub company_csv: String,

        /// Company-to-contact association CSV (CompanyId,VId)
        #[arg(long)]
        pub join_csv: Option<String>,

        /// JSON export of the contacts collection, used to resolve contact references
        #[arg(long)]
        pub contacts_json: Option<String>,

        /// JSON file backing the company store
        #[arg(long, default_value = "./output/companies.json")]
        pub store_path: String,

        /// TOML import config overriding paths and supplying the owner map
        #[arg(long)]
        pub config: Option<String>,

        #[arg(long, help = "Limit number of company rows processed")]
        pub limit: Option<usize>,

        #[arg(long, help = "Prepare the import without writing to the store")]
        pub dry_run: bool,

        #[arg(long, help = "Enable verbose output")]
        pub verbose: bool,
    }

    impl ImportOptions for CliConfig {
        fn company_csv(&self) -> &str {
            &self.company_csv
        }

        fn join_csv(&self) -> Option<&str> {
            self.join_csv.as_deref()
        }

        fn limit(&self) -> Option<usize> {
            self.limit
        }

        fn dry_run(&self) -> bool {
            self.dry_run
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            validate_path("company_csv", &self.company_csv)?;
            validate_file_extension("company_csv", &self.company_csv, &["csv"])?;

            if let Some(join) = &self.join_csv {
                validate_path("join_csv", join)?;
                validate_file_extension("join_csv", join, &["csv"])?;
            }

            if let Some(contacts) = &self.contacts_json {
                validate_path("contacts_json", contacts)?;
                validate_file_extension("contacts_json", contacts, &["json"])?;
            }

            validate_path("store_path", &self.store_path)?;
            validate_file_extension("store_path", &self.store_path, &["json"])?;

            Ok(())
        }
    }
}

#[cfg(feature = "cli")]
pub use cli::CliConfig;
