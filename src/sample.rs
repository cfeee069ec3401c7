//! Reference equipment catalog for trying the selector without real data

use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

use crate::db;
use crate::models::{MiningCondition, NewEquipment};

struct SampleMachine {
    name: &'static str,
    equipment_type: &'static str,
    capacity: &'static str,
    specifications: &'static str,
    operation_type: &'static str,
    material_type: &'static str,
    min_production: f64,
    max_production: f64,
    working_conditions: &'static str,
}

const SAMPLE_MACHINES: &[SampleMachine] = &[
    SampleMachine {
        name: "CAT 992K Loader",
        equipment_type: "Loader",
        capacity: "9.2 m³",
        specifications: "Wheel loader, diesel engine, 650 HP",
        operation_type: "Surface Mining",
        material_type: "Coal",
        min_production: 1000.0,
        max_production: 5000.0,
        working_conditions: "Standard",
    },
    SampleMachine {
        name: "Komatsu PC8000-6 Excavator",
        equipment_type: "Excavator",
        capacity: "42 m³",
        specifications: "Hydraulic excavator, diesel engine, 4020 HP",
        operation_type: "Surface Mining",
        material_type: "Iron Ore",
        min_production: 5000.0,
        max_production: 15000.0,
        working_conditions: "Heavy Duty",
    },
    SampleMachine {
        name: "CAT 797F Dump Truck",
        equipment_type: "Dump Truck",
        capacity: "400 ton",
        specifications: "Mining truck, diesel engine, 4000 HP",
        operation_type: "Surface Mining",
        material_type: "Iron Ore",
        min_production: 10000.0,
        max_production: 25000.0,
        working_conditions: "Heavy Duty",
    },
    SampleMachine {
        name: "Liebherr T 282C Dump Truck",
        equipment_type: "Dump Truck",
        capacity: "363 ton",
        specifications: "Mining truck, diesel engine, 3650 HP",
        operation_type: "Surface Mining",
        material_type: "Coal",
        min_production: 8000.0,
        max_production: 20000.0,
        working_conditions: "Heavy Duty",
    },
    SampleMachine {
        name: "CAT D11T Dozer",
        equipment_type: "Dozer",
        capacity: "N/A",
        specifications: "Track-type tractor, diesel engine, 850 HP",
        operation_type: "Surface Mining",
        material_type: "Overburden",
        min_production: 2000.0,
        max_production: 8000.0,
        working_conditions: "Standard",
    },
    SampleMachine {
        name: "Komatsu WA900-3 Loader",
        equipment_type: "Loader",
        capacity: "17.5 m³",
        specifications: "Wheel loader, diesel engine, 1050 HP",
        operation_type: "Surface Mining",
        material_type: "Iron Ore",
        min_production: 8000.0,
        max_production: 20000.0,
        working_conditions: "Heavy Duty",
    },
];

/// Load the sample catalog.
///
/// Does nothing when the catalog already has equipment, unless `force` is
/// set, in which case the existing catalog is replaced. The replacement is a
/// single transaction, so a failed load keeps the old catalog. Returns the
/// number of machines inserted.
pub fn load_sample_data(conn: &Connection, force: bool) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    if db::count_equipment(&tx)? > 0 {
        if !force {
            info!("catalog already populated, sample data not loaded");
            return Ok(0);
        }
        db::clear_catalog(&tx)?;
    }

    for machine in SAMPLE_MACHINES {
        let id = db::insert_equipment(
            &tx,
            &NewEquipment {
                name: machine.name.to_string(),
                equipment_type: machine.equipment_type.to_string(),
                capacity: Some(machine.capacity.to_string()),
                specifications: Some(machine.specifications.to_string()),
            },
        )?;
        db::insert_condition(
            &tx,
            &MiningCondition {
                equipment_id: id,
                operation_type: Some(machine.operation_type.to_string()),
                material_type: Some(machine.material_type.to_string()),
                min_production: Some(machine.min_production),
                max_production: Some(machine.max_production),
                working_conditions: Some(machine.working_conditions.to_string()),
            },
        )?;
    }
    tx.commit()?;

    info!(machines = SAMPLE_MACHINES.len(), "sample catalog loaded");
    Ok(SAMPLE_MACHINES.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_load_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        db::init_schema(&conn).unwrap();

        assert_eq!(load_sample_data(&conn, false).unwrap(), 6);
        assert_eq!(load_sample_data(&conn, false).unwrap(), 0);
        assert_eq!(db::count_equipment(&conn).unwrap(), 6);

        assert_eq!(load_sample_data(&conn, true).unwrap(), 6);
        assert_eq!(db::count_equipment(&conn).unwrap(), 6);
        assert_eq!(db::load_catalog(&conn).unwrap().len(), 6);
    }

    #[test]
    fn test_failed_forced_load_keeps_existing_catalog() {
        let conn = Connection::open_in_memory().unwrap();
        db::init_schema(&conn).unwrap();
        assert_eq!(load_sample_data(&conn, false).unwrap(), 6);

        conn.execute_batch(
            "CREATE TRIGGER reject_overburden BEFORE INSERT ON mining_conditions
             WHEN NEW.material_type = 'Overburden'
             BEGIN SELECT RAISE(ABORT, 'overburden rows rejected'); END;",
        )
        .unwrap();

        assert!(load_sample_data(&conn, true).is_err());
        assert_eq!(db::count_equipment(&conn).unwrap(), 6);
        assert_eq!(db::load_catalog(&conn).unwrap().len(), 6);
    }
}
