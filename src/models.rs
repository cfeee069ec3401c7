//! Data models for equipment, eligibility and selection results

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A row of the `equipment` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub equipment_type: String,
    pub capacity: Option<String>,
    pub specifications: Option<String>,
}

/// Equipment fields before the database assigns an id
#[derive(Debug, Clone)]
pub struct NewEquipment {
    pub name: String,
    pub equipment_type: String,
    pub capacity: Option<String>,
    pub specifications: Option<String>,
}

/// A row of the `mining_conditions` table. `None` means unrestricted.
#[derive(Debug, Clone, PartialEq)]
pub struct MiningCondition {
    pub equipment_id: i64,
    pub operation_type: Option<String>,
    pub material_type: Option<String>,
    pub min_production: Option<f64>,
    pub max_production: Option<f64>,
    pub working_conditions: Option<String>,
}

/// Daily production window in tons/day. `max` may be infinite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProductionRange {
    min: f64,
    max: f64,
}

impl ProductionRange {
    /// Returns `None` when `min > max` or either bound is NaN.
    pub fn new(min: f64, max: f64) -> Option<Self> {
        if min.is_nan() || max.is_nan() || min > max {
            return None;
        }
        Some(Self { min, max })
    }

    pub fn unbounded() -> Self {
        Self {
            min: 0.0,
            max: f64::INFINITY,
        }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

impl Default for ProductionRange {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl std::fmt::Display for ProductionRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.max.is_infinite() {
            write!(f, "{}+ tons/day", self.min)
        } else {
            write!(f, "{}-{} tons/day", self.min, self.max)
        }
    }
}

/// What a piece of equipment is suited for. Empty sets are wildcards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Eligibility {
    pub operation_types: BTreeSet<String>,
    pub material_types: BTreeSet<String>,
    pub production_range: ProductionRange,
    pub working_conditions: BTreeSet<String>,
}

impl Eligibility {
    pub fn accepts_operation(&self, operation_type: &str) -> bool {
        accepts(&self.operation_types, operation_type)
    }

    pub fn accepts_material(&self, material_type: &str) -> bool {
        accepts(&self.material_types, material_type)
    }

    pub fn accepts_conditions(&self, working_conditions: &str) -> bool {
        accepts(&self.working_conditions, working_conditions)
    }
}

fn accepts(allowed: &BTreeSet<String>, value: &str) -> bool {
    if allowed.is_empty() {
        return true;
    }
    let needle = value.to_lowercase();
    allowed.iter().any(|v| v.to_lowercase() == needle)
}

/// A catalog entry as seen by the scoring engine.
///
/// Each eligibility entry comes from one condition row and is scored on its
/// own; values from different rows never combine.
#[derive(Debug, Clone, PartialEq)]
pub struct EquipmentRecord {
    pub equipment: Equipment,
    pub eligibility: Vec<Eligibility>,
}

/// A validated selection request
#[derive(Debug, Clone, PartialEq)]
pub struct Requirement {
    pub operation_type: String,
    pub material_type: String,
    pub production_target: f64,
    pub working_conditions: String,
}

impl Requirement {
    pub fn is_well_formed(&self) -> bool {
        !self.operation_type.is_empty()
            && !self.material_type.is_empty()
            && !self.working_conditions.is_empty()
            && self.production_target.is_finite()
            && self.production_target > 0.0
    }
}

/// One recommended piece of equipment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredEquipment {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub equipment_type: String,
    pub capacity: Option<String>,
    pub specifications: Option<String>,
    pub compatibility_score: u8,
    pub reasons: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_range_rejects_inverted_bounds() {
        assert!(ProductionRange::new(6000.0, 3000.0).is_none());
        assert!(ProductionRange::new(f64::NAN, 3000.0).is_none());
        assert!(ProductionRange::new(3000.0, 3000.0).is_some());
    }

    #[test]
    fn test_range_contains_is_inclusive() {
        let range = ProductionRange::new(3000.0, 6000.0).unwrap();
        assert!(range.contains(3000.0));
        assert!(range.contains(6000.0));
        assert!(!range.contains(6000.5));
        assert!(ProductionRange::unbounded().contains(1e12));
    }

    #[test]
    fn test_empty_sets_accept_anything() {
        let eligibility = Eligibility::default();
        assert!(eligibility.accepts_operation("Underground"));
        assert!(eligibility.accepts_material("Gold"));
        assert!(eligibility.accepts_conditions("Arctic"));
    }

    #[test]
    fn test_membership_ignores_case() {
        let eligibility = Eligibility {
            material_types: set(&["Iron Ore"]),
            ..Default::default()
        };
        assert!(eligibility.accepts_material("iron ore"));
        assert!(!eligibility.accepts_material("Coal"));
    }

    #[test]
    fn test_scored_equipment_json_uses_type_key() {
        let scored = ScoredEquipment {
            id: 1,
            name: "CAT 992K Loader".to_string(),
            equipment_type: "Loader".to_string(),
            capacity: Some("9.2 m³".to_string()),
            specifications: None,
            compatibility_score: 85,
            reasons: vec!["Designed for Coal handling".to_string()],
        };
        let json = serde_json::to_value(&scored).unwrap();
        assert_eq!(json["type"], "Loader");
        assert_eq!(json["compatibility_score"], 85);
        assert_eq!(json["reasons"][0], "Designed for Coal handling");
    }
}
