use crate::declaration::{DayReport, DeclarationSeed, Revision};
use async_trait::async_trait;
use std::{collections::BTreeMap, path::Path, sync::Arc};
use thiserror::Error as ThisError;
use tokio::sync::RwLock;

#[derive(Debug, ThisError)]
pub enum DeclarationStoreError {
    #[error("Seed could not be read")]
    SeedIo(#[from] std::io::Error),
    #[error("Seed could not be parsed")]
    SeedFormat(#[from] serde_json::Error),
    /// Reserved for backends with a remote connection, the in-memory store never fails a lookup.
    #[error("Store is not available: {0}")]
    Unavailable(String),
}

/// Lookup of the declarations by their (plain) database id.
#[async_trait]
pub trait DeclarationStore: 'static + Send + Sync {
    async fn list_day_reports(&self) -> Result<Vec<DayReport>, DeclarationStoreError>;
    async fn find_day_report(&self, id: u64) -> Result<Option<DayReport>, DeclarationStoreError>;
    async fn list_revisions(&self, day_report_id: u64) -> Result<Vec<Revision>, DeclarationStoreError>;
    async fn find_revision(&self, id: u64) -> Result<Option<Revision>, DeclarationStoreError>;
}

pub type SharedDeclarationStore = Arc<dyn DeclarationStore>;

#[derive(Default)]
struct Tables {
    day_reports: BTreeMap<u64, DayReport>,
    revisions: BTreeMap<u64, Revision>,
}

#[derive(Default)]
pub struct MemoryDeclarationStore {
    tables: RwLock<Tables>,
}

impl MemoryDeclarationStore {
    pub fn from_seed(seed: DeclarationSeed) -> Self {
        let tables = Tables {
            day_reports: seed.day_reports.into_iter().map(|r| (r.id, r)).collect(),
            revisions: seed.revisions.into_iter().map(|r| (r.id, r)).collect(),
        };
        Self {
            tables: RwLock::new(tables),
        }
    }

    pub async fn from_seed_file<P: AsRef<Path>>(path: P) -> Result<Self, DeclarationStoreError> {
        let path = path.as_ref();
        log::info!("Loading declarations from {} ...", path.display());
        let raw = tokio::fs::read(path).await?;
        let seed: DeclarationSeed = serde_json::from_slice(&raw)?;
        log::info!(
            "Loaded {} day reports, {} revisions",
            seed.day_reports.len(),
            seed.revisions.len()
        );
        Ok(Self::from_seed(seed))
    }

    pub async fn insert_day_report(&self, report: DayReport) {
        self.tables.write().await.day_reports.insert(report.id, report);
    }

    pub async fn insert_revision(&self, revision: Revision) {
        self.tables.write().await.revisions.insert(revision.id, revision);
    }
}

#[async_trait]
impl DeclarationStore for MemoryDeclarationStore {
    async fn list_day_reports(&self) -> Result<Vec<DayReport>, DeclarationStoreError> {
        Ok(self.tables.read().await.day_reports.values().cloned().collect())
    }

    async fn find_day_report(&self, id: u64) -> Result<Option<DayReport>, DeclarationStoreError> {
        Ok(self.tables.read().await.day_reports.get(&id).cloned())
    }

    async fn list_revisions(&self, day_report_id: u64) -> Result<Vec<Revision>, DeclarationStoreError> {
        let tables = self.tables.read().await;
        let mut revisions: Vec<_> = tables
            .revisions
            .values()
            .filter(|r| r.day_report_id == day_report_id)
            .cloned()
            .collect();
        revisions.sort_by_key(|r| r.revision_no);
        Ok(revisions)
    }

    async fn find_revision(&self, id: u64) -> Result<Option<Revision>, DeclarationStoreError> {
        Ok(self.tables.read().await.revisions.get(&id).cloned())
    }
}
