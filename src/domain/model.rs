use crate::utils::error::{ImportError, Result};
use crate::utils::normalize::{clean_text, normalize_domain};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Store-assigned identifier for a persisted company record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompanyId(String);

/// Reference to a contact record. Companies only hold the association; the
/// contact's lifecycle belongs to its own collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContactId(String);

/// Reference to the application user that owns a company record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

macro_rules! id_impls {
    ($name:ident) => {
        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

id_impls!(CompanyId);
id_impls!(ContactId);
id_impls!(UserId);

/// Embedded postal address. Free text, stored as given.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub line1: Option<String>,
    pub line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetaNotes {
    pub last_updated: Option<DateTime<Utc>>,
    pub next_activity_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetaAnalytics {
    pub num_page_views: Option<i64>,
    pub num_visits: Option<i64>,
    pub latest_source: Option<String>,
    pub latest_source_data_1: Option<String>,
    pub latest_source_data_2: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetaSocial {
    pub linkedin: Option<String>,
    pub twitter: Option<String>,
    pub facebook: Option<String>,
}

/// Mirror of the upstream CRM's own record-keeping for this company. Carried
/// opaquely: nothing here is validated or normalized, and the timestamps are
/// the external system's, not ours.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyMeta {
    pub company_id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub lifecycle_stage: Option<String>,
    pub score: Option<f64>,
    pub last_contacted: Option<DateTime<Utc>>,
    pub last_activity: Option<DateTime<Utc>>,
    pub source: Option<String>,
    pub notes: MetaNotes,
    pub analytics: MetaAnalytics,
    pub social: MetaSocial,
}

/// Construction input for a [`Company`]: every field except identity and the
/// record timestamps, which the store assigns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanyDraft {
    pub name: String,
    pub domain: Option<String>,
    pub website: Option<String>,
    pub industry: Option<String>,
    pub about: Option<String>,
    pub description: Option<String>,
    pub founded_year: Option<i32>,
    pub number_of_employees: Option<i64>,
    pub annual_revenue: Option<f64>,
    pub revenue_currency: Option<String>,
    pub address: Address,
    pub phone: Option<String>,
    pub timezone: Option<String>,
    pub contacts: Vec<ContactId>,
    pub owner: Option<UserId>,
    pub meta: CompanyMeta,
}

impl CompanyDraft {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// A persisted company record.
///
/// `name` is the only required field and is always stored trimmed; `domain`
/// is stored trimmed and lowercased; the remaining text fields are trimmed
/// where noted on [`normalize`](Company::normalize). `created_at` is frozen at
/// creation and `updated_at` advances on every mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    pub domain: Option<String>,
    pub website: Option<String>,
    pub industry: Option<String>,
    pub about: Option<String>,
    pub description: Option<String>,
    pub founded_year: Option<i32>,
    pub number_of_employees: Option<i64>,
    pub annual_revenue: Option<f64>,
    pub revenue_currency: Option<String>,
    pub address: Address,
    pub phone: Option<String>,
    pub timezone: Option<String>,
    pub contacts: Vec<ContactId>,
    pub owner: Option<UserId>,
    pub meta: CompanyMeta,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Company {
    /// Builds a record from a draft. Fails when `name` is missing or empty
    /// after trimming; every other field is accepted as-is. Both record
    /// timestamps start at the same instant.
    pub fn create(id: CompanyId, draft: CompanyDraft) -> Result<Self> {
        validate_name(&draft.name)?;

        let now = Utc::now();
        let mut company = Self {
            id,
            name: draft.name,
            domain: draft.domain,
            website: draft.website,
            industry: draft.industry,
            about: draft.about,
            description: draft.description,
            founded_year: draft.founded_year,
            number_of_employees: draft.number_of_employees,
            annual_revenue: draft.annual_revenue,
            revenue_currency: draft.revenue_currency,
            address: draft.address,
            phone: draft.phone,
            timezone: draft.timezone,
            contacts: draft.contacts,
            owner: draft.owner,
            meta: draft.meta,
            created_at: now,
            updated_at: now,
        };
        company.normalize();
        Ok(company)
    }

    /// Replaces every draft-carried field with the draft's values, keeping
    /// identity and `created_at`. This is the upsert-update path.
    pub fn apply(&mut self, draft: CompanyDraft) -> Result<()> {
        validate_name(&draft.name)?;

        self.name = draft.name;
        self.domain = draft.domain;
        self.website = draft.website;
        self.industry = draft.industry;
        self.about = draft.about;
        self.description = draft.description;
        self.founded_year = draft.founded_year;
        self.number_of_employees = draft.number_of_employees;
        self.annual_revenue = draft.annual_revenue;
        self.revenue_currency = draft.revenue_currency;
        self.address = draft.address;
        self.phone = draft.phone;
        self.timezone = draft.timezone;
        self.contacts = draft.contacts;
        self.owner = draft.owner;
        self.meta = draft.meta;
        self.normalize();
        self.touch();
        Ok(())
    }

    /// Trims all trimmed text fields and lowercases `domain`. Idempotent:
    /// normalizing an already-normalized record changes nothing.
    pub fn normalize(&mut self) {
        self.name = self.name.trim().to_string();
        self.domain = self.domain.take().and_then(|v| normalize_domain(&v));
        self.website = trim_opt(self.website.take());
        self.industry = trim_opt(self.industry.take());
        self.about = trim_opt(self.about.take());
        self.description = trim_opt(self.description.take());
        self.revenue_currency = trim_opt(self.revenue_currency.take());
        self.phone = trim_opt(self.phone.take());
        self.timezone = trim_opt(self.timezone.take());
    }

    pub fn rename(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        validate_name(&name)?;
        self.name = name.trim().to_string();
        self.touch();
        Ok(())
    }

    pub fn set_domain(&mut self, domain: Option<String>) {
        self.domain = domain.and_then(|v| normalize_domain(&v));
        self.touch();
    }

    pub fn set_owner(&mut self, owner: Option<UserId>) {
        self.owner = owner;
        self.touch();
    }

    /// Appends a contact association, preserving insertion order. Duplicates
    /// and dangling references are the caller's concern.
    pub fn add_contact(&mut self, contact: ContactId) {
        self.contacts.push(contact);
        self.touch();
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(ImportError::validation(
            "name",
            "must be present and non-empty",
        ));
    }
    Ok(())
}

fn trim_opt(value: Option<String>) -> Option<String> {
    value.and_then(|v| clean_text(&v))
}

/// One raw CSV row, header-keyed. Missing columns read as empty strings, the
/// same contract a string-typed dataframe gives.
#[derive(Debug, Clone, Default)]
pub struct RawRow {
    pub columns: HashMap<String, String>,
}

impl RawRow {
    pub fn field(&self, name: &str) -> &str {
        self.columns.get(name).map_or("", String::as_str)
    }
}

/// A prepared upsert: the external CRM id that keys it plus the draft to
/// write.
#[derive(Debug, Clone)]
pub struct CompanyUpsert {
    pub external_id: String,
    pub draft: CompanyDraft,
}

/// Output of the transform stage.
#[derive(Debug, Clone, Default)]
pub struct ImportBatch {
    pub upserts: Vec<CompanyUpsert>,
    pub skipped: usize,
}

/// Outcome of a pipeline run.
#[derive(Debug, Clone, Default)]
pub struct ImportSummary {
    pub prepared: usize,
    pub upserted: usize,
    pub skipped: usize,
    pub dry_run: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id() -> CompanyId {
        CompanyId::new("company-000001")
    }

    #[test]
    fn test_create_trims_name() {
        let company = Company::create(id(), CompanyDraft::named("  Acme  ")).unwrap();
        assert_eq!(company.name, "Acme");
    }

    #[test]
    fn test_create_lowercases_domain() {
        let mut draft = CompanyDraft::named("Acme");
        draft.domain = Some(" ACME.COM ".to_string());
        let company = Company::create(id(), draft).unwrap();
        assert_eq!(company.domain.as_deref(), Some("acme.com"));
    }

    #[test]
    fn test_create_rejects_missing_name() {
        let err = Company::create(id(), CompanyDraft::default()).unwrap_err();
        match err {
            ImportError::ValidationError { field, .. } => assert_eq!(field, "name"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_create_rejects_whitespace_name() {
        assert!(Company::create(id(), CompanyDraft::named("   ")).is_err());
    }

    #[test]
    fn test_create_sets_equal_timestamps() {
        let company = Company::create(id(), CompanyDraft::named("Acme")).unwrap();
        assert_eq!(company.created_at(), company.updated_at());
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let mut draft = CompanyDraft::named("  Globex  ");
        draft.domain = Some("Globex.IO".to_string());
        draft.website = Some("  https://globex.io  ".to_string());
        draft.phone = Some(" +1 314 555 0000 ".to_string());

        let mut company = Company::create(id(), draft).unwrap();
        let once = company.clone();
        company.normalize();

        assert_eq!(company.name, once.name);
        assert_eq!(company.domain, once.domain);
        assert_eq!(company.website, once.website);
        assert_eq!(company.phone, once.phone);
    }

    #[test]
    fn test_normalize_collapses_blank_optionals() {
        let mut draft = CompanyDraft::named("Acme");
        draft.industry = Some("   ".to_string());
        let company = Company::create(id(), draft).unwrap();
        assert_eq!(company.industry, None);
    }

    #[test]
    fn test_address_is_not_normalized() {
        let mut draft = CompanyDraft::named("Acme");
        draft.address.line1 = Some("  12 Main St  ".to_string());
        let company = Company::create(id(), draft).unwrap();
        assert_eq!(company.address.line1.as_deref(), Some("  12 Main St  "));
    }

    #[test]
    fn test_mutation_advances_updated_at() {
        let mut company = Company::create(id(), CompanyDraft::named("Acme")).unwrap();
        let created = company.created_at();
        let before = company.updated_at();

        company.rename("Acme Corp").unwrap();

        assert!(company.updated_at() >= before);
        assert_eq!(company.created_at(), created);
        assert_eq!(company.name, "Acme Corp");
    }

    #[test]
    fn test_rename_rejects_empty_name() {
        let mut company = Company::create(id(), CompanyDraft::named("Acme")).unwrap();
        assert!(company.rename("  ").is_err());
        assert_eq!(company.name, "Acme");
    }

    #[test]
    fn test_contacts_preserve_insertion_order() {
        let mut company = Company::create(id(), CompanyDraft::named("Acme")).unwrap();
        assert!(company.contacts.is_empty());

        company.add_contact(ContactId::new("c1"));
        company.add_contact(ContactId::new("c2"));
        company.add_contact(ContactId::new("c3"));

        let ids: Vec<&str> = company.contacts.iter().map(ContactId::as_str).collect();
        assert_eq!(ids, vec!["c1", "c2", "c3"]);
    }

    #[test]
    fn test_apply_keeps_created_at() {
        let mut company = Company::create(id(), CompanyDraft::named("Acme")).unwrap();
        let created = company.created_at();

        let mut draft = CompanyDraft::named("Acme Corp");
        draft.domain = Some("ACME.COM".to_string());
        company.apply(draft).unwrap();

        assert_eq!(company.created_at(), created);
        assert_eq!(company.name, "Acme Corp");
        assert_eq!(company.domain.as_deref(), Some("acme.com"));
    }

    #[test]
    fn test_raw_row_missing_field_reads_empty() {
        let row = RawRow::default();
        assert_eq!(row.field("name"), "");
    }
}
