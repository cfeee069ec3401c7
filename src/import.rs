//! Import equipment definitions from JSON files
//!
//! Each `*.json` file under the import directory holds either a single
//! equipment definition or an array of them:
//!
//! ```json
//! {
//!   "name": "Hitachi EX5600 Shovel",
//!   "type": "Excavator",
//!   "capacity": "29 m³",
//!   "conditions": [
//!     { "operation_type": "Surface Mining", "material_type": "Coal",
//!       "min_production": 6000, "max_production": 18000,
//!       "working_conditions": "Heavy Duty" }
//!   ]
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusqlite::Connection;
use serde::Deserialize;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::db;
use crate::models::{MiningCondition, NewEquipment};

#[derive(Debug, Clone, Deserialize)]
pub struct ConditionDefinition {
    pub operation_type: Option<String>,
    pub material_type: Option<String>,
    pub min_production: Option<f64>,
    pub max_production: Option<f64>,
    pub working_conditions: Option<String>,
}

impl ConditionDefinition {
    /// Missing bounds read as 0 and open-ended, the way the catalog loads them.
    fn has_valid_range(&self) -> bool {
        let min = self.min_production.unwrap_or(0.0);
        let max = self.max_production.unwrap_or(f64::INFINITY);
        min >= 0.0 && max >= 0.0 && min <= max
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EquipmentDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub equipment_type: String,
    pub capacity: Option<String>,
    pub specifications: Option<String>,
    #[serde(default)]
    pub conditions: Vec<ConditionDefinition>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DefinitionFile {
    Many(Vec<EquipmentDefinition>),
    One(EquipmentDefinition),
}

/// Find all JSON files below a directory, in a stable order
pub fn find_definition_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path.to_path_buf());
        }
    }

    Ok(files)
}

/// Parse a single definition file
pub fn parse_definition_file(path: &Path) -> Result<Vec<EquipmentDefinition>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let parsed: DefinitionFile = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    Ok(match parsed {
        DefinitionFile::Many(defs) => defs,
        DefinitionFile::One(def) => vec![def],
    })
}

fn insert_definition(
    conn: &Connection,
    definition: &EquipmentDefinition,
    stats: &mut ImportStats,
) -> Result<()> {
    let id = db::insert_equipment(
        conn,
        &NewEquipment {
            name: definition.name.clone(),
            equipment_type: definition.equipment_type.clone(),
            capacity: definition.capacity.clone(),
            specifications: definition.specifications.clone(),
        },
    )?;
    stats.equipment += 1;

    for condition in &definition.conditions {
        if !condition.has_valid_range() {
            warn!(
                equipment = %definition.name,
                min = ?condition.min_production,
                max = ?condition.max_production,
                "invalid production range, condition skipped"
            );
            stats.skipped += 1;
            continue;
        }

        db::insert_condition(
            conn,
            &MiningCondition {
                equipment_id: id,
                operation_type: condition.operation_type.clone(),
                material_type: condition.material_type.clone(),
                min_production: condition.min_production,
                max_production: condition.max_production,
                working_conditions: condition.working_conditions.clone(),
            },
        )?;
        stats.conditions += 1;
    }

    Ok(())
}

/// Import every definition file below `dir` into the catalog
pub fn import_directory(conn: &Connection, dir: &Path) -> Result<ImportStats> {
    let mut stats = ImportStats::default();

    info!(dir = %dir.display(), "scanning for equipment definitions");
    let files = find_definition_files(dir)?;
    info!(files = files.len(), "definition files found");

    for path in &files {
        match parse_definition_file(path) {
            Ok(definitions) => {
                let tx = conn.unchecked_transaction()?;
                for definition in &definitions {
                    insert_definition(&tx, definition, &mut stats)?;
                }
                tx.commit()?;
                info!(
                    file = %path.display(),
                    equipment = definitions.len(),
                    "definitions imported"
                );
            }
            Err(e) => {
                warn!(file = %path.display(), error = %format!("{:#}", e), "skipping unreadable file");
                stats.errors += 1;
            }
        }
    }

    Ok(stats)
}

#[derive(Debug, Default, PartialEq)]
pub struct ImportStats {
    pub equipment: usize,
    pub conditions: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl std::fmt::Display for ImportStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Imported {} equipment ({} conditions). Skipped: {}, Errors: {}",
            self.equipment, self.conditions, self.skipped, self.errors
        )
    }
}
