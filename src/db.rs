//! Database schema and catalog operations

use std::collections::BTreeSet;

use anyhow::Result;
use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, warn};

use crate::models::{
    Eligibility, Equipment, EquipmentRecord, MiningCondition, NewEquipment, ProductionRange,
};

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Equipment catalog (display data only)
        CREATE TABLE IF NOT EXISTS equipment (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            type TEXT NOT NULL,
            capacity TEXT,
            specifications TEXT
        );

        -- What each piece of equipment is suited for; NULL columns are unrestricted
        CREATE TABLE IF NOT EXISTS mining_conditions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            equipment_id INTEGER NOT NULL REFERENCES equipment (id),
            operation_type TEXT,
            material_type TEXT,
            min_production REAL,
            max_production REAL,
            working_conditions TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_mining_conditions_equipment ON mining_conditions(equipment_id);
        "#,
    )?;
    Ok(())
}

/// Insert a piece of equipment, returning its new id
pub fn insert_equipment(conn: &Connection, equipment: &NewEquipment) -> Result<i64> {
    conn.execute(
        "INSERT INTO equipment (name, type, capacity, specifications) VALUES (?1, ?2, ?3, ?4)",
        (
            &equipment.name,
            &equipment.equipment_type,
            &equipment.capacity,
            &equipment.specifications,
        ),
    )?;
    Ok(conn.last_insert_rowid())
}

/// Insert an eligibility row
pub fn insert_condition(conn: &Connection, condition: &MiningCondition) -> Result<()> {
    conn.execute(
        "INSERT INTO mining_conditions
            (equipment_id, operation_type, material_type, min_production, max_production, working_conditions)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        (
            condition.equipment_id,
            &condition.operation_type,
            &condition.material_type,
            condition.min_production,
            condition.max_production,
            &condition.working_conditions,
        ),
    )?;
    Ok(())
}

/// Remove all equipment and conditions
pub fn clear_catalog(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        DELETE FROM mining_conditions;
        DELETE FROM equipment;
        "#,
    )?;
    Ok(())
}

/// Number of equipment rows
pub fn count_equipment(conn: &Connection) -> Result<usize> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM equipment", [], |row| row.get(0))?;
    Ok(count as usize)
}

fn equipment_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Equipment> {
    Ok(Equipment {
        id: row.get(0)?,
        name: row.get(1)?,
        equipment_type: row.get(2)?,
        capacity: row.get(3)?,
        specifications: row.get(4)?,
    })
}

/// List all equipment in catalog order
pub fn list_equipment(conn: &Connection) -> Result<Vec<Equipment>> {
    let mut stmt =
        conn.prepare("SELECT id, name, type, capacity, specifications FROM equipment ORDER BY id")?;

    let rows = stmt.query_map([], equipment_from_row)?;

    let mut results = Vec::new();
    for row in rows {
        results.push(row?);
    }
    Ok(results)
}

/// Look up a single piece of equipment
pub fn get_equipment(conn: &Connection, id: i64) -> Result<Option<Equipment>> {
    let equipment = conn
        .query_row(
            "SELECT id, name, type, capacity, specifications FROM equipment WHERE id = ?1",
            [id],
            equipment_from_row,
        )
        .optional()?;
    Ok(equipment)
}

/// Get all eligibility rows for a piece of equipment
pub fn get_conditions(conn: &Connection, equipment_id: i64) -> Result<Vec<MiningCondition>> {
    let mut stmt = conn.prepare(
        "SELECT equipment_id, operation_type, material_type, min_production, max_production, working_conditions
         FROM mining_conditions
         WHERE equipment_id = ?1
         ORDER BY id",
    )?;

    let rows = stmt.query_map([equipment_id], |row| {
        Ok(MiningCondition {
            equipment_id: row.get(0)?,
            operation_type: row.get(1)?,
            material_type: row.get(2)?,
            min_production: row.get(3)?,
            max_production: row.get(4)?,
            working_conditions: row.get(5)?,
        })
    })?;

    let mut results = Vec::new();
    for row in rows {
        results.push(row?);
    }
    Ok(results)
}

/// Turn one condition row into the rule set it describes.
///
/// NULL or blank columns are unrestricted, a NULL min is 0 and a NULL max is
/// open-ended. Returns `None` when the stored range is negative or inverted.
pub fn row_eligibility(condition: &MiningCondition) -> Option<Eligibility> {
    let min = condition.min_production.unwrap_or(0.0);
    let max = condition.max_production.unwrap_or(f64::INFINITY);
    if min < 0.0 || max < 0.0 {
        return None;
    }

    Some(Eligibility {
        operation_types: value_set(condition.operation_type.as_deref()),
        material_types: value_set(condition.material_type.as_deref()),
        production_range: ProductionRange::new(min, max)?,
        working_conditions: value_set(condition.working_conditions.as_deref()),
    })
}

fn value_set(value: Option<&str>) -> BTreeSet<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => BTreeSet::from([v.to_string()]),
        _ => BTreeSet::new(),
    }
}

/// Load the catalog snapshot the scoring engine works on.
///
/// Equipment without any eligibility rows is left out, and so is equipment
/// with a row whose stored range cannot be scored.
pub fn load_catalog(conn: &Connection) -> Result<Vec<EquipmentRecord>> {
    let equipment = list_equipment(conn)?;
    let mut records = Vec::with_capacity(equipment.len());

    'equipment: for item in equipment {
        let conditions = get_conditions(conn, item.id)?;
        if conditions.is_empty() {
            debug!(id = item.id, name = %item.name, "no eligibility rows, skipping");
            continue;
        }

        let mut eligibility = Vec::with_capacity(conditions.len());
        for condition in &conditions {
            match row_eligibility(condition) {
                Some(row) => eligibility.push(row),
                None => {
                    warn!(
                        id = item.id,
                        name = %item.name,
                        min = ?condition.min_production,
                        max = ?condition.max_production,
                        "invalid production range, equipment left out"
                    );
                    continue 'equipment;
                }
            }
        }

        records.push(EquipmentRecord {
            equipment: item,
            eligibility,
        });
    }

    debug!(records = records.len(), "catalog snapshot loaded");
    Ok(records)
}
