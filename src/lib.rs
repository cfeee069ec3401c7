//! Mining equipment selector
//!
//! Ranks a catalog of mining equipment against an operator's requirements
//! and analyzes dragline productivity data.

pub mod catalog;
pub mod config;
pub mod db;
pub mod import;
pub mod logging;
pub mod models;
pub mod productivity;
pub mod requirement;
pub mod sample;
pub mod scoring;

pub use catalog::{EquipmentCatalog, recommend};
pub use config::{ConfigError, ScoringConfig};
pub use models::{EquipmentRecord, Requirement, ScoredEquipment};
pub use requirement::{RequirementError, RequirementInput};
pub use scoring::select;
