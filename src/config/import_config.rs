use crate::domain::model::UserId;
use crate::utils::error::{ImportError, Result};
use crate::utils::validation::{
    validate_file_extension, validate_non_empty_string, validate_path, Validate,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Import run configuration loaded from a TOML file: where the CSV exports
/// live, where the store lives, and the mapping from external owner ids to
/// application user ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    pub paths: PathsConfig,
    #[serde(default)]
    pub owners: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    pub company_csv: String,
    pub company_join_csv: Option<String>,
    pub contacts_json: Option<String>,
    pub store: String,
}

impl ImportConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content).map_err(|e| ImportError::ConfigError {
            message: format!("Failed to parse {}: {}", path.display(), e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Owner lookup table keyed by the external CRM owner id.
    pub fn owner_map(&self) -> HashMap<String, UserId> {
        self.owners
            .iter()
            .map(|(external, user)| (external.clone(), UserId::new(user.clone())))
            .collect()
    }
}

impl Validate for ImportConfig {
    fn validate(&self) -> Result<()> {
        validate_path("paths.company_csv", &self.paths.company_csv)?;
        validate_file_extension("paths.company_csv", &self.paths.company_csv, &["csv"])?;

        if let Some(join) = &self.paths.company_join_csv {
            validate_path("paths.company_join_csv", join)?;
            validate_file_extension("paths.company_join_csv", join, &["csv"])?;
        }

        if let Some(contacts) = &self.paths.contacts_json {
            validate_path("paths.contacts_json", contacts)?;
            validate_file_extension("paths.contacts_json", contacts, &["json"])?;
        }

        validate_path("paths.store", &self.paths.store)?;
        validate_file_extension("paths.store", &self.paths.store, &["json"])?;

        for (external, user) in &self.owners {
            validate_non_empty_string("owners.key", external)?;
            validate_non_empty_string("owners.value", user)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_from_file() {
        let file = write_config(
            r#"
[paths]
company_csv = "./data/Company.csv"
company_join_csv = "./data/CompanyContactAssociations.csv"
contacts_json = "./data/contacts.json"
store = "./output/companies.json"

[owners]
"84379854" = "user-1"
"93716953" = "user-2"
"#,
        );

        let config = ImportConfig::from_file(file.path()).unwrap();
        assert_eq!(config.paths.company_csv, "./data/Company.csv");
        assert_eq!(config.owners.len(), 2);

        let owners = config.owner_map();
        assert_eq!(owners.get("84379854"), Some(&UserId::new("user-1")));
    }

    #[test]
    fn test_owners_section_is_optional() {
        let file = write_config(
            r#"
[paths]
company_csv = "./data/Company.csv"
store = "./output/companies.json"
"#,
        );

        let config = ImportConfig::from_file(file.path()).unwrap();
        assert!(config.owners.is_empty());
        assert!(config.paths.company_join_csv.is_none());
    }

    #[test]
    fn test_rejects_wrong_extension() {
        let file = write_config(
            r#"
[paths]
company_csv = "./data/Company.txt"
store = "./output/companies.json"
"#,
        );

        assert!(ImportConfig::from_file(file.path()).is_err());
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let file = write_config("paths = nonsense [");
        let err = ImportConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ImportError::ConfigError { .. }));
    }
}
