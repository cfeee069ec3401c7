//! Equipment compatibility scoring
//!
//! Every catalog entry is scored against the requirement by a fixed, ordered
//! table of weighted criteria. Entries below the configured minimum are
//! dropped and the rest are ranked by score, keeping catalog order on ties.

use tracing::debug;

use crate::config::{PRODUCTION_WEIGHT, ScoringConfig};
use crate::models::{Eligibility, EquipmentRecord, Requirement, ScoredEquipment};

/// Upper bound of a compatibility score
pub const MAX_SCORE: u8 = 100;

/// Relative slack on the tolerance band edges so `6200 * 0.8` admits 4960
const BAND_SLACK: f64 = 1e-12;

/// Points and explanation earned by one criterion
#[derive(Debug, Clone, PartialEq)]
pub struct Credit {
    pub points: u8,
    pub reason: String,
}

struct Criterion {
    name: &'static str,
    weight: u8,
    evaluate: fn(&Requirement, &Eligibility, &ScoringConfig, u8) -> Option<Credit>,
}

const CRITERIA: &[Criterion] = &[
    Criterion {
        name: "operation_type",
        weight: 30,
        evaluate: operation_type_match,
    },
    Criterion {
        name: "material_type",
        weight: 30,
        evaluate: material_type_match,
    },
    Criterion {
        name: "production_target",
        weight: PRODUCTION_WEIGHT,
        evaluate: production_fit,
    },
    Criterion {
        name: "working_conditions",
        weight: 15,
        evaluate: working_conditions_match,
    },
];

fn operation_type_match(
    req: &Requirement,
    eligibility: &Eligibility,
    _config: &ScoringConfig,
    weight: u8,
) -> Option<Credit> {
    eligibility
        .accepts_operation(&req.operation_type)
        .then(|| Credit {
            points: weight,
            reason: format!("Suitable for {} operations", req.operation_type),
        })
}

fn material_type_match(
    req: &Requirement,
    eligibility: &Eligibility,
    _config: &ScoringConfig,
    weight: u8,
) -> Option<Credit> {
    eligibility
        .accepts_material(&req.material_type)
        .then(|| Credit {
            points: weight,
            reason: format!("Designed for {} handling", req.material_type),
        })
}

fn production_fit(
    req: &Requirement,
    eligibility: &Eligibility,
    config: &ScoringConfig,
    weight: u8,
) -> Option<Credit> {
    let target = req.production_target;
    let range = &eligibility.production_range;

    if range.contains(target) {
        return Some(Credit {
            points: weight,
            reason: format!("Production capacity matches target ({} tons/day)", target),
        });
    }

    let tolerance = config.production_tolerance;
    let lower_edge = range.min() * (1.0 - tolerance);
    let upper_edge = range.max() * (1.0 + tolerance);

    if target < range.min() && target >= lower_edge - lower_edge * BAND_SLACK {
        return Some(Credit {
            points: config.partial_credit,
            reason: format!(
                "Production capacity close to target (min {} tons/day)",
                range.min()
            ),
        });
    }
    if target > range.max() && target <= upper_edge + upper_edge * BAND_SLACK {
        return Some(Credit {
            points: config.partial_credit,
            reason: format!(
                "Production capacity close to target (max {} tons/day)",
                range.max()
            ),
        });
    }

    None
}

fn working_conditions_match(
    req: &Requirement,
    eligibility: &Eligibility,
    _config: &ScoringConfig,
    weight: u8,
) -> Option<Credit> {
    eligibility
        .accepts_conditions(&req.working_conditions)
        .then(|| Credit {
            points: weight,
            reason: format!("Meets {} operating requirements", req.working_conditions),
        })
}

/// Score a single entry. Returns the clamped score and the reasons in
/// criterion order.
pub fn score_record(
    req: &Requirement,
    eligibility: &Eligibility,
    config: &ScoringConfig,
) -> (u8, Vec<String>) {
    let mut score: u32 = 0;
    let mut reasons = Vec::new();

    for criterion in CRITERIA {
        if let Some(credit) = (criterion.evaluate)(req, eligibility, config, criterion.weight) {
            debug!(
                criterion = criterion.name,
                points = credit.points,
                "criterion satisfied"
            );
            score += u32::from(credit.points);
            reasons.push(credit.reason);
        }
    }

    (score.min(u32::from(MAX_SCORE)) as u8, reasons)
}

/// Score every eligibility row of an entry and keep the best one. The
/// earliest row wins a tie. `None` when the entry has no rows.
pub fn best_match(
    req: &Requirement,
    rows: &[Eligibility],
    config: &ScoringConfig,
) -> Option<(u8, Vec<String>)> {
    let mut best: Option<(u8, Vec<String>)> = None;
    for eligibility in rows {
        let (score, reasons) = score_record(req, eligibility, config);
        if best.as_ref().is_none_or(|(top, _)| score > *top) {
            best = Some((score, reasons));
        }
    }
    best
}

/// Rank the catalog against a requirement.
///
/// The requirement must already be validated; passing a malformed one is a
/// caller bug.
pub fn select(
    req: &Requirement,
    catalog: &[EquipmentRecord],
    config: &ScoringConfig,
) -> Vec<ScoredEquipment> {
    debug_assert!(req.is_well_formed(), "requirement must be validated before scoring");

    let mut recommendations: Vec<ScoredEquipment> = catalog
        .iter()
        .filter_map(|record| {
            let (score, reasons) = best_match(req, &record.eligibility, config)?;
            if score < config.minimum_score {
                return None;
            }
            let equipment = &record.equipment;
            Some(ScoredEquipment {
                id: equipment.id,
                name: equipment.name.clone(),
                equipment_type: equipment.equipment_type.clone(),
                capacity: equipment.capacity.clone(),
                specifications: equipment.specifications.clone(),
                compatibility_score: score,
                reasons,
            })
        })
        .collect();

    // sort_by is stable: equal scores keep catalog order
    recommendations.sort_by(|a, b| b.compatibility_score.cmp(&a.compatibility_score));

    debug!(
        candidates = catalog.len(),
        selected = recommendations.len(),
        "equipment selection complete"
    );

    recommendations
}

/// Format recommendations as a ranked, readable list
pub fn format_recommendations(recommendations: &[ScoredEquipment]) -> String {
    let mut output = String::new();

    for (rank, item) in recommendations.iter().enumerate() {
        output.push_str(&format!(
            "{:>2}. {} [{}] score {}\n",
            rank + 1,
            item.name,
            item.equipment_type,
            item.compatibility_score
        ));
        if let Some(capacity) = &item.capacity {
            output.push_str(&format!("    capacity: {}\n", capacity));
        }
        for reason in &item.reasons {
            output.push_str(&format!("    - {}\n", reason));
        }
    }

    output
}
