//! End-to-end selection against a SQLite catalog

use std::fs;

use rusqlite::Connection;

use mining_selector::models::{
    Eligibility, Equipment, EquipmentRecord, MiningCondition, NewEquipment, ProductionRange,
};
use mining_selector::{
    RequirementInput, ScoringConfig, db, import, logging, recommend, sample, select,
};

fn sample_db() -> Connection {
    logging::init_test();
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    sample::load_sample_data(&conn, false).unwrap();
    conn
}

fn request(json: &str) -> mining_selector::Requirement {
    RequirementInput::from_json(json).unwrap().validate().unwrap()
}

#[test]
fn test_coal_request_ranks_sample_catalog() {
    let conn = sample_db();
    let req = request(
        r#"{"operation_type": "Surface Mining", "material_type": "Coal",
            "production_target": 5000, "working_conditions": "Standard"}"#,
    );

    let result = recommend(&conn, &req, &ScoringConfig::default()).unwrap();

    // Every sample machine is rated for surface mining
    assert_eq!(result.len(), 6);
    assert_eq!(result[0].name, "CAT 992K Loader");
    assert_eq!(result[0].compatibility_score, 100);
    assert_eq!(result[0].reasons.len(), 4);

    // D11T: operation + range + conditions
    assert_eq!(result[1].name, "CAT D11T Dozer");
    assert_eq!(result[1].compatibility_score, 70);

    let scores: Vec<u8> = result.iter().map(|r| r.compatibility_score).collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn test_ties_follow_catalog_order() {
    let conn = sample_db();
    let req = request(
        r#"{"operation_type": "Surface Mining", "material_type": "Iron Ore",
            "production_target": "12,000 tons/day", "working_conditions": "Heavy Duty"}"#,
    );

    let result = recommend(&conn, &req, &ScoringConfig::default()).unwrap();
    let top: Vec<(&str, u8)> = result
        .iter()
        .take(3)
        .map(|r| (r.name.as_str(), r.compatibility_score))
        .collect();

    assert_eq!(
        top,
        vec![
            ("Komatsu PC8000-6 Excavator", 100),
            ("CAT 797F Dump Truck", 100),
            ("Komatsu WA900-3 Loader", 100),
        ]
    );
}

#[test]
fn test_json_output_contract() {
    let conn = sample_db();
    let req = request(
        r#"{"operation_type": "Surface Mining", "material_type": "Coal",
            "production_target": 5000, "working_conditions": "Standard"}"#,
    );

    let result = recommend(&conn, &req, &ScoringConfig::default()).unwrap();
    let json = serde_json::to_value(&result).unwrap();
    let first = json[0].as_object().unwrap();

    for key in [
        "id",
        "name",
        "type",
        "capacity",
        "specifications",
        "compatibility_score",
        "reasons",
    ] {
        assert!(first.contains_key(key), "missing key {}", key);
    }
    assert_eq!(first.len(), 7);
}

#[test]
fn test_empty_catalog_is_not_an_error() {
    logging::init_test();
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    let req = request(
        r#"{"operation_type": "Surface Mining", "material_type": "Coal",
            "production_target": 5000, "working_conditions": "Standard"}"#,
    );

    assert!(recommend(&conn, &req, &ScoringConfig::default()).unwrap().is_empty());
}

#[test]
fn test_select_from_threads_matches_single_call() {
    let catalog = vec![
        EquipmentRecord {
            equipment: Equipment {
                id: 1,
                name: "Bucyrus 8750 Dragline".to_string(),
                equipment_type: "Dragline".to_string(),
                capacity: Some("116 m³".to_string()),
                specifications: None,
            },
            eligibility: vec![Eligibility {
                operation_types: ["Surface Mining".to_string()].into(),
                material_types: ["Overburden".to_string()].into(),
                production_range: ProductionRange::new(20000.0, 60000.0).unwrap(),
                working_conditions: Default::default(),
            }],
        },
    ];
    let req = request(
        r#"{"operation_type": "Surface Mining", "material_type": "Overburden",
            "production_target": 17000, "working_conditions": "Wet"}"#,
    );
    let config = ScoringConfig::default();
    let expected = select(&req, &catalog, &config);
    assert_eq!(expected[0].compatibility_score, 85);

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(|| select(&req, &catalog, &config)))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

#[test]
fn test_imported_equipment_is_recommended() {
    logging::init_test();
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("shovels.json"),
        r#"[{
            "name": "Hitachi EX5600 Shovel",
            "type": "Excavator",
            "capacity": "29 m³",
            "conditions": [
                {"operation_type": "Surface Mining", "material_type": "Copper Ore",
                 "min_production": 6000, "max_production": 18000,
                 "working_conditions": "Heavy Duty"},
                {"operation_type": "Surface Mining", "material_type": "Coal",
                 "min_production": 9000, "max_production": 1000}
            ]
        }]"#,
    )
    .unwrap();
    fs::write(dir.path().join("broken.json"), "{ not json").unwrap();

    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    let stats = import::import_directory(&conn, dir.path()).unwrap();

    assert_eq!(stats.equipment, 1);
    assert_eq!(stats.conditions, 1);
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.errors, 1);

    let req = request(
        r#"{"operation_type": "surface mining", "material_type": "copper ore",
            "production_target": 8000, "working_conditions": "heavy duty"}"#,
    );
    let result = recommend(&conn, &req, &ScoringConfig::default()).unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].compatibility_score, 100);
    assert_eq!(result[0].reasons[0], "Suitable for surface mining operations");
}

#[test]
fn test_bad_stored_range_does_not_break_selection() {
    let conn = sample_db();
    let id = db::insert_equipment(
        &conn,
        &NewEquipment {
            name: "Misconfigured Loader".to_string(),
            equipment_type: "Loader".to_string(),
            capacity: None,
            specifications: None,
        },
    )
    .unwrap();
    db::insert_condition(
        &conn,
        &MiningCondition {
            equipment_id: id,
            operation_type: Some("Surface Mining".to_string()),
            material_type: Some("Coal".to_string()),
            min_production: Some(9000.0),
            max_production: Some(1000.0),
            working_conditions: Some("Standard".to_string()),
        },
    )
    .unwrap();

    let req = request(
        r#"{"operation_type": "Surface Mining", "material_type": "Coal",
            "production_target": 5000, "working_conditions": "Standard"}"#,
    );
    let result = recommend(&conn, &req, &ScoringConfig::default()).unwrap();

    assert_eq!(result.len(), 6);
    assert!(result.iter().all(|r| r.id != id));
}

#[test]
fn test_disjoint_rows_do_not_combine() {
    logging::init_test();
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    let id = db::insert_equipment(
        &conn,
        &NewEquipment {
            name: "Dual Duty Loader".to_string(),
            equipment_type: "Loader".to_string(),
            capacity: None,
            specifications: None,
        },
    )
    .unwrap();
    for (material, min, max) in [("Coal", 1000.0, 2000.0), ("Overburden", 8000.0, 9000.0)] {
        db::insert_condition(
            &conn,
            &MiningCondition {
                equipment_id: id,
                operation_type: Some("Surface Mining".to_string()),
                material_type: Some(material.to_string()),
                min_production: Some(min),
                max_production: Some(max),
                working_conditions: Some("Standard".to_string()),
            },
        )
        .unwrap();
    }

    // Coal at 5000 tons/day fits neither row's range
    let req = request(
        r#"{"operation_type": "Surface Mining", "material_type": "Coal",
            "production_target": 5000, "working_conditions": "Standard"}"#,
    );
    let result = recommend(&conn, &req, &ScoringConfig::default()).unwrap();

    assert_eq!(result.len(), 1);
    assert_eq!(result[0].compatibility_score, 75);
    assert!(
        result[0]
            .reasons
            .iter()
            .all(|r| !r.starts_with("Production capacity"))
    );
}
