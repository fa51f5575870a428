use crate::domain::model::{Company, CompanyDraft, CompanyId};
use crate::domain::ports::CompanyStore;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared record table keyed by the external CRM id. Both backends drive the
/// same upsert semantics; only durability differs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoreState {
    next_id: u64,
    companies: HashMap<String, Company>,
}

impl StoreState {
    fn upsert(&mut self, external_id: &str, draft: CompanyDraft) -> Result<CompanyId> {
        if let Some(existing) = self.companies.get_mut(external_id) {
            existing.apply(draft)?;
            Ok(existing.id.clone())
        } else {
            self.next_id += 1;
            let id = CompanyId::new(format!("company-{:06}", self.next_id));
            let company = Company::create(id.clone(), draft)?;
            self.companies.insert(external_id.to_string(), company);
            Ok(id)
        }
    }

    fn get(&self, id: &CompanyId) -> Option<Company> {
        self.companies.values().find(|c| &c.id == id).cloned()
    }

    fn delete(&mut self, id: &CompanyId) -> bool {
        let key = self
            .companies
            .iter()
            .find(|(_, c)| &c.id == id)
            .map(|(k, _)| k.clone());
        match key {
            Some(k) => {
                self.companies.remove(&k);
                true
            }
            None => false,
        }
    }
}

/// In-memory company store, used by tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CompanyStore for MemoryStore {
    async fn upsert(&self, external_id: &str, draft: CompanyDraft) -> Result<CompanyId> {
        let mut state = self.state.lock().await;
        state.upsert(external_id, draft)
    }

    async fn get(&self, id: &CompanyId) -> Result<Option<Company>> {
        let state = self.state.lock().await;
        Ok(state.get(id))
    }

    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<Company>> {
        let state = self.state.lock().await;
        Ok(state.companies.get(external_id).cloned())
    }

    async fn delete(&self, id: &CompanyId) -> Result<bool> {
        let mut state = self.state.lock().await;
        Ok(state.delete(id))
    }

    async fn count(&self) -> Result<usize> {
        let state = self.state.lock().await;
        Ok(state.companies.len())
    }
}

/// File-backed company store: the whole table lives in one JSON document,
/// rewritten after every mutation. Good enough for import-sized data.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
    state: Arc<Mutex<StoreState>>,
}

impl JsonStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let state = if path.exists() {
            let data = std::fs::read(&path)?;
            serde_json::from_slice(&data)?
        } else {
            StoreState::default()
        };
        Ok(Self {
            path,
            state: Arc::new(Mutex::new(state)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, state: &StoreState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(state)?;
        std::fs::write(&self.path, data)?;
        Ok(())
    }
}

#[async_trait]
impl CompanyStore for JsonStore {
    async fn upsert(&self, external_id: &str, draft: CompanyDraft) -> Result<CompanyId> {
        let mut state = self.state.lock().await;
        let id = state.upsert(external_id, draft)?;
        self.persist(&state)?;
        Ok(id)
    }

    async fn get(&self, id: &CompanyId) -> Result<Option<Company>> {
        let state = self.state.lock().await;
        Ok(state.get(id))
    }

    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<Company>> {
        let state = self.state.lock().await;
        Ok(state.companies.get(external_id).cloned())
    }

    async fn delete(&self, id: &CompanyId) -> Result<bool> {
        let mut state = self.state.lock().await;
        let deleted = state.delete(id);
        if deleted {
            self.persist(&state)?;
        }
        Ok(deleted)
    }

    async fn count(&self) -> Result<usize> {
        let state = self.state.lock().await;
        Ok(state.companies.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ContactId;

    fn draft(name: &str) -> CompanyDraft {
        CompanyDraft::named(name)
    }

    #[tokio::test]
    async fn test_upsert_inserts_then_updates() {
        let store = MemoryStore::new();

        let id = store.upsert("hs-1", draft("Acme")).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 1);

        let id_again = store.upsert("hs-1", draft("Acme Corp")).await.unwrap();
        assert_eq!(id, id_again);
        assert_eq!(store.count().await.unwrap(), 1);

        let company = store.get(&id).await.unwrap().unwrap();
        assert_eq!(company.name, "Acme Corp");
    }

    #[tokio::test]
    async fn test_upsert_update_keeps_created_at() {
        let store = MemoryStore::new();

        let id = store.upsert("hs-1", draft("Acme")).await.unwrap();
        let created = store.get(&id).await.unwrap().unwrap().created_at();

        store.upsert("hs-1", draft("Acme Corp")).await.unwrap();
        let company = store.get(&id).await.unwrap().unwrap();

        assert_eq!(company.created_at(), created);
        assert!(company.updated_at() >= created);
    }

    #[tokio::test]
    async fn test_upsert_assigns_distinct_ids() {
        let store = MemoryStore::new();
        let a = store.upsert("hs-1", draft("Acme")).await.unwrap();
        let b = store.upsert("hs-2", draft("Globex")).await.unwrap();
        assert_ne!(a, b);
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_upsert_rejects_invalid_draft() {
        let store = MemoryStore::new();
        assert!(store.upsert("hs-1", draft("   ")).await.is_err());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_find_by_external_id() {
        let store = MemoryStore::new();
        store.upsert("hs-1", draft("Acme")).await.unwrap();

        let found = store.find_by_external_id("hs-1").await.unwrap();
        assert_eq!(found.unwrap().name, "Acme");
        assert!(store.find_by_external_id("hs-9").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemoryStore::new();
        let id = store.upsert("hs-1", draft("Acme")).await.unwrap();

        assert!(store.delete(&id).await.unwrap());
        assert!(!store.delete(&id).await.unwrap());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_json_store_roundtrip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("companies.json");

        let id = {
            let store = JsonStore::open(&path).unwrap();
            let mut d = draft("Globex");
            d.domain = Some("Globex.IO".to_string());
            d.contacts = vec![ContactId::new("c1"), ContactId::new("c2")];
            store.upsert("hs-7", d).await.unwrap()
        };

        // Reopen from disk and check the record survived intact.
        let store = JsonStore::open(&path).unwrap();
        let company = store.get(&id).await.unwrap().unwrap();
        assert_eq!(company.name, "Globex");
        assert_eq!(company.domain.as_deref(), Some("globex.io"));
        assert_eq!(company.contacts.len(), 2);

        // Id assignment continues past the persisted counter.
        let next = store.upsert("hs-8", draft("Initech")).await.unwrap();
        assert_ne!(next, id);
    }
}
