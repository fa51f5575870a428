use crate::core::{
    CompanyStore, ContactDirectory, ImportBatch, ImportOptions, ImportPipeline, ImportSummary,
};
use crate::domain::model::{
    Address, CompanyDraft, CompanyMeta, CompanyUpsert, ContactId, MetaAnalytics, MetaNotes,
    MetaSocial, RawRow, UserId,
};
use crate::utils::error::Result;
use crate::utils::normalize::{clean_text, normalize_phone, parse_date, parse_float, parse_int};
use std::collections::HashMap;

/// Imports a HubSpot company CSV export: rows become company drafts, the
/// join CSV becomes contact associations, and everything is upserted into
/// the store keyed by the external company id.
pub struct CompanyPipeline<S: CompanyStore, D: ContactDirectory, C: ImportOptions> {
    store: S,
    directory: D,
    options: C,
    owners: HashMap<String, UserId>,
}

impl<S: CompanyStore, D: ContactDirectory, C: ImportOptions> CompanyPipeline<S, D, C> {
    pub fn new(store: S, directory: D, options: C) -> Self {
        Self {
            store,
            directory,
            options,
            owners: HashMap::new(),
        }
    }

    /// External owner id → application user id table, usually from the TOML
    /// config.
    pub fn with_owners(mut self, owners: HashMap<String, UserId>) -> Self {
        self.owners = owners;
        self
    }

    fn read_rows(&self, path: &str, limit: Option<usize>) -> Result<Vec<RawRow>> {
        let mut reader = csv::Reader::from_path(path)?;
        let headers = reader.headers()?.clone();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let mut columns = HashMap::new();
            for (header, value) in headers.iter().zip(record.iter()) {
                columns.insert(header.to_string(), value.to_string());
            }
            rows.push(RawRow { columns });

            if let Some(limit) = limit {
                if rows.len() >= limit {
                    break;
                }
            }
        }
        Ok(rows)
    }

    /// Preloads the company↔contact join CSV, resolving each contact
    /// external id through the directory. Unresolvable contacts are dropped
    /// from the association; CSV order is preserved per company.
    fn contact_associations(&self) -> Result<HashMap<String, Vec<ContactId>>> {
        let mut map: HashMap<String, Vec<ContactId>> = HashMap::new();
        let Some(path) = self.options.join_csv() else {
            return Ok(map);
        };

        tracing::debug!("Preloading contact associations from: {}", path);
        for row in self.read_rows(path, None)? {
            let company_id = row.field("CompanyId").trim();
            let vid = row.field("VId").trim();
            if company_id.is_empty() || vid.is_empty() {
                continue;
            }
            if let Some(contact) = self.directory.resolve(vid) {
                map.entry(company_id.to_string()).or_default().push(contact);
            }
        }
        Ok(map)
    }

    /// Maps one CSV row to a prepared upsert. Returns `None` (a skip) when
    /// the row has no external id or no usable name; the name falls back to
    /// the website column when blank.
    fn row_to_upsert(&self, row: &RawRow, contacts: Vec<ContactId>) -> Option<CompanyUpsert> {
        let external_id = row.field("CompanyId").trim().to_string();
        if external_id.is_empty() {
            return None;
        }

        let name =
            clean_text(row.field("name")).or_else(|| clean_text(row.field("website")))?;

        let opt = |column: &str| clean_text(row.field(column));
        // Address fields are carried as given, no normalization.
        let raw = |column: &str| {
            let value = row.field(column);
            if value.is_empty() {
                None
            } else {
                Some(value.to_string())
            }
        };

        let draft = CompanyDraft {
            name,
            domain: opt("domain"),
            website: opt("website"),
            industry: opt("industry"),
            about: opt("about_us"),
            description: opt("description"),
            founded_year: parse_int(row.field("founded_year"))
                .and_then(|y| i32::try_from(y).ok()),
            number_of_employees: parse_int(row.field("numberofemployees")),
            annual_revenue: parse_float(row.field("annualrevenue")),
            revenue_currency: opt("hs_annual_revenue_currency_code"),
            address: Address {
                line1: raw("address"),
                line2: raw("address2"),
                city: raw("city"),
                state: raw("state"),
                zip: raw("zip"),
                country: raw("country"),
            },
            phone: normalize_phone(row.field("phone")),
            timezone: opt("timezone"),
            contacts,
            owner: self
                .owners
                .get(row.field("hs_all_owner_ids").trim())
                .cloned(),
            meta: CompanyMeta {
                company_id: Some(external_id.clone()),
                created_at: parse_date(row.field("hs_createdate")),
                updated_at: parse_date(row.field("hs_lastmodifieddate")),
                lifecycle_stage: opt("lifecyclestage"),
                score: parse_float(row.field("hubspotscore")),
                last_contacted: parse_date(row.field("notes_last_contacted")),
                last_activity: parse_date(row.field("notes_last_updated")),
                source: opt("hs_object_source"),
                notes: MetaNotes {
                    last_updated: parse_date(row.field("notes_last_updated")),
                    next_activity_date: parse_date(row.field("notes_next_activity_date")),
                },
                analytics: MetaAnalytics {
                    num_page_views: parse_int(row.field("hs_analytics_num_page_views")),
                    num_visits: parse_int(row.field("hs_analytics_num_visits")),
                    latest_source: opt("hs_analytics_latest_source"),
                    latest_source_data_1: opt("hs_analytics_latest_source_data_1"),
                    latest_source_data_2: opt("hs_analytics_latest_source_data_2"),
                },
                social: MetaSocial {
                    linkedin: opt("linkedin_company_page"),
                    twitter: opt("twitterhandle"),
                    facebook: opt("facebook_company_page"),
                },
            },
        };

        Some(CompanyUpsert { external_id, draft })
    }
}

#[async_trait::async_trait]
impl<S: CompanyStore, D: ContactDirectory, C: ImportOptions> ImportPipeline
    for CompanyPipeline<S, D, C>
{
    async fn extract(&self) -> Result<Vec<RawRow>> {
        tracing::debug!("Loading companies from: {}", self.options.company_csv());
        self.read_rows(self.options.company_csv(), self.options.limit())
    }

    async fn transform(&self, rows: Vec<RawRow>) -> Result<ImportBatch> {
        let associations = self.contact_associations()?;

        let mut upserts = Vec::new();
        let mut skipped = 0;
        for row in &rows {
            let external_id = row.field("CompanyId").trim();
            // Non-destructive lookup: duplicate rows for the same company
            // must each carry the full contact list.
            let contacts = associations
                .get(external_id)
                .cloned()
                .unwrap_or_default();
            match self.row_to_upsert(row, contacts) {
                Some(upsert) => upserts.push(upsert),
                None => skipped += 1,
            }
        }

        Ok(ImportBatch { upserts, skipped })
    }

    async fn load(&self, batch: ImportBatch) -> Result<ImportSummary> {
        let prepared = batch.upserts.len();

        if self.options.dry_run() {
            tracing::info!(
                "Dry run: {} upserts prepared, {} rows skipped",
                prepared,
                batch.skipped
            );
            return Ok(ImportSummary {
                prepared,
                upserted: 0,
                skipped: batch.skipped,
                dry_run: true,
            });
        }

        let mut upserted = 0;
        for upsert in batch.upserts {
            self.store.upsert(&upsert.external_id, upsert.draft).await?;
            upserted += 1;
        }

        Ok(ImportSummary {
            prepared,
            upserted,
            skipped: batch.skipped,
            dry_run: false,
        })
    }
}
