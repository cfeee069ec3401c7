//! Validation of raw selection requests

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use crate::models::Requirement;

#[derive(Error, Debug)]
pub enum RequirementError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("production target is not a number: {0:?}")]
    InvalidProductionTarget(String),

    #[error("production target must be positive, got {0}")]
    NonPositiveProductionTarget(f64),
}

static TARGET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(-?[\d,]*\.?\d+)\s*(?:t|tons?|tonnes?)?\s*(?:/\s*(?:d|day))?$")
        .expect("production target pattern is valid")
});

/// Production target as it arrives: a JSON number or free text
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ProductionTarget {
    Number(f64),
    Text(String),
}

/// Unvalidated request body
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RequirementInput {
    pub operation_type: Option<String>,
    pub material_type: Option<String>,
    pub production_target: Option<ProductionTarget>,
    pub working_conditions: Option<String>,
}

impl RequirementInput {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn validate(&self) -> Result<Requirement, RequirementError> {
        let operation_type = required(&self.operation_type, "operation_type")?;
        let material_type = required(&self.material_type, "material_type")?;

        let production_target = match &self.production_target {
            Some(ProductionTarget::Number(n)) => *n,
            Some(ProductionTarget::Text(text)) => parse_production_target(text)?,
            None => return Err(RequirementError::MissingField("production_target")),
        };
        if !production_target.is_finite() || production_target <= 0.0 {
            return Err(RequirementError::NonPositiveProductionTarget(production_target));
        }

        let working_conditions = required(&self.working_conditions, "working_conditions")?;

        Ok(Requirement {
            operation_type,
            material_type,
            production_target,
            working_conditions,
        })
    }
}

fn required(value: &Option<String>, field: &'static str) -> Result<String, RequirementError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(RequirementError::MissingField(field)),
    }
}

/// Parse "5000", "5,000", "5000 t/d" or "5000 tons/day"
pub fn parse_production_target(text: &str) -> Result<f64, RequirementError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(RequirementError::MissingField("production_target"));
    }

    let cap = TARGET_RE
        .captures(trimmed)
        .ok_or_else(|| RequirementError::InvalidProductionTarget(text.to_string()))?;

    cap[1]
        .replace(',', "")
        .parse::<f64>()
        .map_err(|_| RequirementError::InvalidProductionTarget(text.to_string()))
}
