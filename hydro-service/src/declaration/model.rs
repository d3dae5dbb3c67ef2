use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DayReport {
    pub id: u64,
    pub plant: String,
    pub date: NaiveDate,
    pub generation_mwh: f64,
    pub declared_capacity_mw: f64,
}

/// A dispatch revision of a day report
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Revision {
    pub id: u64,
    pub day_report_id: u64,
    pub revision_no: u32,
    pub dispatch_mw: f64,
    #[serde(default)]
    pub acknowledged: bool,
}

/// Initial content of the store, see `MemoryDeclarationStore::from_seed`
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DeclarationSeed {
    #[serde(default)]
    pub day_reports: Vec<DayReport>,
    #[serde(default)]
    pub revisions: Vec<Revision>,
}
