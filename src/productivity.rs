//! Dragline productivity analysis
//!
//! Works on per-shift operating records: cleans them, then derives
//! productivity rate, cost per cubic metre and availability per dragline,
//! and optionally compares the dragline fleet against truck-and-shovel cost.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize, Serializer};
use tracing::{info, warn};

/// One row of dragline operating data
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OperationRecord {
    pub dragline_id: String,
    pub date: Option<String>,
    pub operation_hours: Option<f64>,
    pub downtime_hours: Option<f64>,
    /// Cubic metres
    pub volume_moved: Option<f64>,
    pub fuel_consumption: Option<f64>,
    pub fuel_cost: Option<f64>,
    pub maintenance_cost: Option<f64>,
    pub labor_cost: Option<f64>,
    pub depreciation_cost: Option<f64>,
}

/// Columns whose gaps are filled with the column mean
#[derive(Debug, Clone, Copy)]
enum FillColumn {
    Downtime,
    FuelCost,
    MaintenanceCost,
    LaborCost,
    DepreciationCost,
}

const FILL_COLUMNS: [FillColumn; 5] = [
    FillColumn::Downtime,
    FillColumn::FuelCost,
    FillColumn::MaintenanceCost,
    FillColumn::LaborCost,
    FillColumn::DepreciationCost,
];

impl OperationRecord {
    fn column_mut(&mut self, column: FillColumn) -> &mut Option<f64> {
        match column {
            FillColumn::Downtime => &mut self.downtime_hours,
            FillColumn::FuelCost => &mut self.fuel_cost,
            FillColumn::MaintenanceCost => &mut self.maintenance_cost,
            FillColumn::LaborCost => &mut self.labor_cost,
            FillColumn::DepreciationCost => &mut self.depreciation_cost,
        }
    }

    /// Identity used for dropping duplicate rows. Floats compare by bit pattern.
    fn dedup_key(&self) -> (String, Option<String>, [Option<u64>; 8]) {
        let bits = |v: Option<f64>| v.map(f64::to_bits);
        (
            self.dragline_id.clone(),
            self.date.clone(),
            [
                bits(self.operation_hours),
                bits(self.downtime_hours),
                bits(self.volume_moved),
                bits(self.fuel_consumption),
                bits(self.fuel_cost),
                bits(self.maintenance_cost),
                bits(self.labor_cost),
                bits(self.depreciation_cost),
            ],
        )
    }

    fn cost_components(&self) -> [Option<f64>; 4] {
        [
            self.fuel_cost,
            self.maintenance_cost,
            self.labor_cost,
            self.depreciation_cost,
        ]
    }
}

/// Read operating records from a CSV file with a header row
pub fn read_records(path: &Path) -> Result<Vec<OperationRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let mut records = Vec::new();
    for row in reader.deserialize() {
        let record: OperationRecord =
            row.with_context(|| format!("Failed to parse {}", path.display()))?;
        records.push(record);
    }

    info!(path = %path.display(), records = records.len(), "operating data loaded");
    Ok(records)
}

/// Drop duplicates and incomplete rows, then fill gaps in the remaining
/// numeric columns with the column mean.
///
/// Rows must carry a dragline id, operating hours and volume moved. Fuel
/// consumption is required too when any row reports it.
pub fn preprocess(records: Vec<OperationRecord>) -> Vec<OperationRecord> {
    let input_len = records.len();

    let mut seen = HashSet::with_capacity(records.len());
    let unique: Vec<OperationRecord> = records
        .into_iter()
        .filter(|r| seen.insert(r.dedup_key()))
        .collect();

    let fuel_reported = unique.iter().any(|r| r.fuel_consumption.is_some());
    let mut cleaned: Vec<OperationRecord> = unique
        .into_iter()
        .filter(|r| {
            !r.dragline_id.trim().is_empty()
                && r.operation_hours.is_some()
                && r.volume_moved.is_some()
                && (!fuel_reported || r.fuel_consumption.is_some())
        })
        .collect();

    for column in FILL_COLUMNS {
        let (sum, count) = cleaned
            .iter_mut()
            .filter_map(|r| *r.column_mut(column))
            .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
        if count == 0 {
            continue;
        }
        let mean = sum / count as f64;
        for record in &mut cleaned {
            let value = record.column_mut(column);
            if value.is_none() {
                *value = Some(mean);
            }
        }
    }

    info!(
        input = input_len,
        kept = cleaned.len(),
        "operating data preprocessed"
    );
    cleaned
}

fn group_by_dragline(records: &[OperationRecord]) -> BTreeMap<&str, Vec<&OperationRecord>> {
    let mut groups: BTreeMap<&str, Vec<&OperationRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(record.dragline_id.as_str()).or_default().push(record);
    }
    groups
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraglineMetrics {
    pub total_hours: f64,
    /// Cubic metres
    pub total_volume: f64,
    /// Cubic metres per operating hour
    pub productivity_rate: f64,
    /// Absent when no cost data was reported for this dragline
    pub total_cost: Option<f64>,
    /// Infinite when nothing was moved; written to JSON as `"inf"`
    #[serde(serialize_with = "serialize_cost_per_m3")]
    pub cost_per_cubic_meter: Option<f64>,
}

fn serialize_cost_per_m3<S: Serializer>(
    value: &Option<f64>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match value {
        Some(v) if v.is_infinite() => serializer.serialize_str("inf"),
        Some(v) => serializer.serialize_f64(*v),
        None => serializer.serialize_none(),
    }
}

/// Productivity and cost per dragline, keyed by dragline id
pub fn productivity_metrics(records: &[OperationRecord]) -> BTreeMap<String, DraglineMetrics> {
    let mut results = BTreeMap::new();

    for (dragline_id, group) in group_by_dragline(records) {
        let total_hours: f64 = group.iter().filter_map(|r| r.operation_hours).sum();
        let total_volume: f64 = group.iter().filter_map(|r| r.volume_moved).sum();

        let productivity_rate = if total_hours > 0.0 {
            total_volume / total_hours
        } else {
            0.0
        };

        let costs: Vec<f64> = group
            .iter()
            .flat_map(|r| r.cost_components())
            .flatten()
            .collect();
        let total_cost = (!costs.is_empty()).then(|| costs.iter().sum::<f64>());

        let cost_per_cubic_meter = total_cost.map(|cost| {
            if total_volume > 0.0 {
                cost / total_volume
            } else {
                f64::INFINITY
            }
        });

        results.insert(
            dragline_id.to_string(),
            DraglineMetrics {
                total_hours,
                total_volume,
                productivity_rate,
                total_cost,
                cost_per_cubic_meter,
            },
        );
    }

    info!(draglines = results.len(), "productivity metrics calculated");
    results
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EfficiencyMetrics {
    /// Fraction of scheduled hours spent operating, 0..=1
    pub availability: f64,
    pub total_operational_hours: f64,
    pub total_downtime_hours: f64,
}

/// Availability per dragline. Empty when the data has no downtime column.
pub fn operational_efficiency(records: &[OperationRecord]) -> BTreeMap<String, EfficiencyMetrics> {
    let mut results = BTreeMap::new();

    if !records.iter().any(|r| r.downtime_hours.is_some()) {
        warn!("no downtime data, skipping efficiency analysis");
        return results;
    }

    for (dragline_id, group) in group_by_dragline(records) {
        let operating: f64 = group.iter().filter_map(|r| r.operation_hours).sum();
        let downtime: f64 = group.iter().filter_map(|r| r.downtime_hours).sum();
        let scheduled = operating + downtime;

        let availability = if scheduled > 0.0 {
            1.0 - downtime / scheduled
        } else {
            0.0
        };

        results.insert(
            dragline_id.to_string(),
            EfficiencyMetrics {
                availability,
                total_operational_hours: operating,
                total_downtime_hours: downtime,
            },
        );
    }

    info!(draglines = results.len(), "efficiency analysis complete");
    results
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodComparison {
    pub avg_dragline_cost_per_m3: f64,
    pub avg_truck_shovel_cost_per_m3: f64,
    pub cost_saving_per_m3: f64,
    pub percent_saving: f64,
}

fn average_unit_cost(metrics: &BTreeMap<String, DraglineMetrics>) -> Option<f64> {
    let costs: Vec<f64> = metrics
        .values()
        .filter_map(|m| m.cost_per_cubic_meter)
        .filter(|c| c.is_finite())
        .collect();
    if costs.is_empty() {
        return None;
    }
    Some(costs.iter().sum::<f64>() / costs.len() as f64)
}

/// Compare average cost per cubic metre of the dragline fleet against a
/// truck-and-shovel fleet. `None` when either side lacks cost data.
pub fn compare_methods(
    dragline: &BTreeMap<String, DraglineMetrics>,
    truck_shovel: &BTreeMap<String, DraglineMetrics>,
) -> Option<MethodComparison> {
    let Some(avg_dragline) = average_unit_cost(dragline) else {
        warn!("dragline metrics carry no cost data");
        return None;
    };
    let Some(avg_truck_shovel) = average_unit_cost(truck_shovel) else {
        warn!("truck-and-shovel metrics carry no cost data");
        return None;
    };

    let saving = avg_truck_shovel - avg_dragline;
    let percent_saving = if avg_truck_shovel > 0.0 {
        saving / avg_truck_shovel * 100.0
    } else {
        0.0
    };

    Some(MethodComparison {
        avg_dragline_cost_per_m3: avg_dragline,
        avg_truck_shovel_cost_per_m3: avg_truck_shovel,
        cost_saving_per_m3: saving,
        percent_saving,
    })
}

/// Full analysis result
#[derive(Debug, Clone, Serialize)]
pub struct ProductivityReport {
    pub metrics: BTreeMap<String, DraglineMetrics>,
    pub efficiency: BTreeMap<String, EfficiencyMetrics>,
    pub comparison: Option<MethodComparison>,
}

/// Preprocess and analyze dragline records, optionally against
/// truck-and-shovel records
pub fn analyze(
    records: Vec<OperationRecord>,
    truck_shovel: Option<Vec<OperationRecord>>,
) -> ProductivityReport {
    let records = preprocess(records);
    let metrics = productivity_metrics(&records);
    let efficiency = operational_efficiency(&records);

    let comparison = truck_shovel.and_then(|other| {
        let other_metrics = productivity_metrics(&preprocess(other));
        compare_methods(&metrics, &other_metrics)
    });

    ProductivityReport {
        metrics,
        efficiency,
        comparison,
    }
}

impl std::fmt::Display for ProductivityReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Dragline Productivity Summary ===")?;
        writeln!(f, "Draglines analyzed: {}", self.metrics.len())?;

        for (id, m) in &self.metrics {
            writeln!(f)?;
            writeln!(f, "Dragline {}:", id)?;
            writeln!(f, "  Total volume moved:  {:.0} m³", m.total_volume)?;
            writeln!(f, "  Operating hours:     {:.1} h", m.total_hours)?;
            writeln!(f, "  Productivity rate:   {:.2} m³/h", m.productivity_rate)?;
            match m.cost_per_cubic_meter {
                Some(cost) => writeln!(f, "  Cost per m³:         {:.2}", cost)?,
                None => writeln!(f, "  Cost per m³:         n/a")?,
            }
            if let Some(e) = self.efficiency.get(id) {
                writeln!(f, "  Availability:        {:.1}%", e.availability * 100.0)?;
            }
        }

        if let Some(c) = &self.comparison {
            writeln!(f)?;
            writeln!(f, "Dragline vs truck-and-shovel:")?;
            writeln!(f, "  Dragline cost per m³:        {:.2}", c.avg_dragline_cost_per_m3)?;
            writeln!(f, "  Truck-and-shovel cost per m³: {:.2}", c.avg_truck_shovel_cost_per_m3)?;
            writeln!(
                f,
                "  Saving per m³:               {:.2} ({:.1}%)",
                c.cost_saving_per_m3, c.percent_saving
            )?;
        }

        Ok(())
    }
}
