//! Catalog access for the scoring engine

use anyhow::Result;
use rusqlite::Connection;

use crate::config::ScoringConfig;
use crate::db;
use crate::models::{EquipmentRecord, Requirement, ScoredEquipment};
use crate::scoring;

/// Anything that can hand out a read-only snapshot of the equipment catalog
pub trait EquipmentCatalog {
    fn snapshot(&self) -> Result<Vec<EquipmentRecord>>;
}

impl EquipmentCatalog for Connection {
    fn snapshot(&self) -> Result<Vec<EquipmentRecord>> {
        db::load_catalog(self)
    }
}

impl EquipmentCatalog for [EquipmentRecord] {
    fn snapshot(&self) -> Result<Vec<EquipmentRecord>> {
        Ok(self.to_vec())
    }
}

impl EquipmentCatalog for Vec<EquipmentRecord> {
    fn snapshot(&self) -> Result<Vec<EquipmentRecord>> {
        Ok(self.clone())
    }
}

/// Take a snapshot and rank it against the requirement
pub fn recommend<C: EquipmentCatalog + ?Sized>(
    catalog: &C,
    req: &Requirement,
    config: &ScoringConfig,
) -> Result<Vec<ScoredEquipment>> {
    let snapshot = catalog.snapshot()?;
    Ok(scoring::select(req, &snapshot, config))
}
