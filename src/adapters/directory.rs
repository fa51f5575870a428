use crate::domain::model::ContactId;
use crate::domain::ports::ContactDirectory;
use crate::utils::error::Result;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Contact lookup table held in memory. The import preloads the whole
/// directory once, then resolves per row.
#[derive(Debug, Clone, Default)]
pub struct MemoryDirectory {
    entries: HashMap<String, ContactId>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, external_id: impl Into<String>, contact: ContactId) {
        self.entries.insert(external_id.into(), contact);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ContactDirectory for MemoryDirectory {
    fn resolve(&self, external_id: &str) -> Option<ContactId> {
        self.entries.get(external_id).cloned()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContactRef {
    id: String,
    external_id: Option<String>,
}

/// Loads a contact directory from a JSON export of the contacts collection
/// (an array of objects carrying `id` and `externalId`). Entries without an
/// external id are skipped.
pub fn load_directory(path: impl AsRef<Path>) -> Result<MemoryDirectory> {
    let data = std::fs::read(path.as_ref())?;
    let refs: Vec<ContactRef> = serde_json::from_slice(&data)?;

    let mut directory = MemoryDirectory::new();
    for contact in refs {
        if let Some(external_id) = contact.external_id {
            if !external_id.is_empty() {
                directory.insert(external_id, ContactId::new(contact.id));
            }
        }
    }
    Ok(directory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_resolve() {
        let mut directory = MemoryDirectory::new();
        directory.insert("hs-c-1", ContactId::new("c1"));

        assert_eq!(directory.resolve("hs-c-1"), Some(ContactId::new("c1")));
        assert_eq!(directory.resolve("hs-c-2"), None);
    }

    #[test]
    fn test_load_directory_skips_missing_external_ids() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"id": "c1", "externalId": "hs-c-1"}},
                {{"id": "c2"}},
                {{"id": "c3", "externalId": ""}}
            ]"#
        )
        .unwrap();

        let directory = load_directory(file.path()).unwrap();
        assert_eq!(directory.len(), 1);
        assert_eq!(directory.resolve("hs-c-1"), Some(ContactId::new("c1")));
    }
}
