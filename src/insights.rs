//! Aggregates over stored simulations: dashboard figures and side-by-side comparison

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Result, SimError};
use crate::projection::round_half_up;
use crate::store::SimulationRecord;
use crate::viability::{milestones, MILESTONE_BREAK_EVEN, MILESTONE_PROFIT_MARGIN, MILESTONE_ROI};

/// ROI at which a simulation earns the top badge
pub const STANDOUT_ROI: f64 = 150.0;

/// Records sorted by ROI, highest first, truncated to `n`
pub fn top_performers(records: &[SimulationRecord], n: usize) -> Vec<&SimulationRecord> {
    let mut sorted: Vec<&SimulationRecord> = records.iter().collect();
    sorted.sort_by(|a, b| b.results.roi.total_cmp(&a.results.roi));
    sorted.truncate(n);
    sorted
}

/// Mean stored ROI; 0 for an empty slice
pub fn average_roi(records: &[SimulationRecord]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    records.iter().map(|r| r.results.roi).sum::<f64>() / records.len() as f64
}

pub fn total_net_profit(records: &[SimulationRecord]) -> f64 {
    records.iter().map(|r| r.results.net_profit).sum()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelPerformance {
    pub business_model: String,
    pub simulations: usize,
    /// Average ROI rounded to a whole percent
    pub average_roi: f64,
}

/// Average ROI per business model, ordered by model name
pub fn model_performance(records: &[SimulationRecord]) -> Vec<ModelPerformance> {
    let mut grouped: BTreeMap<&str, (usize, f64)> = BTreeMap::new();
    for record in records {
        let entry = grouped.entry(record.business_model.as_str()).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += record.results.roi;
    }

    grouped
        .into_iter()
        .map(|(model, (count, roi_sum))| ModelPerformance {
            business_model: model.to_string(),
            simulations: count,
            average_roi: round_half_up(roi_sum / count as f64),
        })
        .collect()
}

/// First `n` records that reached any milestone, in the order given
pub fn milestone_simulations(records: &[SimulationRecord], n: usize) -> Vec<&SimulationRecord> {
    records
        .iter()
        .filter(|r| !milestones(&r.results).is_empty())
        .take(n)
        .collect()
}

/// Short badge for the most notable milestone a record reached
pub fn milestone_badge(record: &SimulationRecord) -> Option<&'static str> {
    let results = &record.results;
    if results.roi >= STANDOUT_ROI {
        Some("ROI 150%+")
    } else if results.roi >= MILESTONE_ROI {
        Some("ROI 100%+")
    } else if results.profit_margin >= MILESTONE_PROFIT_MARGIN {
        Some("30% Margin")
    } else if results.break_even_year > 0 && results.break_even_year <= MILESTONE_BREAK_EVEN {
        Some("Quick Break-even")
    } else {
        None
    }
}

/// Dashboard summary over a user's simulations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insights {
    pub simulations: usize,
    pub average_roi: f64,
    pub total_net_profit: f64,
    pub top_performers: Vec<String>,
    pub milestone_simulations: Vec<String>,
    pub model_performance: Vec<ModelPerformance>,
}

impl Insights {
    pub fn from_records(records: &[SimulationRecord]) -> Self {
        Self {
            simulations: records.len(),
            average_roi: average_roi(records),
            total_net_profit: total_net_profit(records),
            top_performers: top_performers(records, 3).into_iter().map(|r| r.id.clone()).collect(),
            milestone_simulations: milestone_simulations(records, 3)
                .into_iter()
                .map(|r| r.id.clone())
                .collect(),
            model_performance: model_performance(records),
        }
    }
}

/// One column of a side-by-side comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonRow {
    pub simulation_id: String,
    pub business_model: String,
    pub roi: f64,
    pub profit_margin: f64,
    pub net_profit_thousands: f64,
    pub revenue_thousands: f64,
    /// Net profit as a percentage of total costs
    pub efficiency: f64,
}

impl From<&SimulationRecord> for ComparisonRow {
    fn from(record: &SimulationRecord) -> Self {
        let results = &record.results;
        let cost_base = if results.total_cost == 0.0 { 1.0 } else { results.total_cost };
        Self {
            simulation_id: record.id.clone(),
            business_model: record.business_model.clone(),
            roi: results.roi,
            profit_margin: results.profit_margin,
            net_profit_thousands: results.net_profit / 1000.0,
            revenue_thousands: results.total_revenue / 1000.0,
            efficiency: results.net_profit / cost_base * 100.0,
        }
    }
}

/// Comparison rows for two or more simulations
pub fn comparison_rows(records: &[SimulationRecord]) -> Result<Vec<ComparisonRow>> {
    if records.len() < 2 {
        return Err(SimError::NotEnoughSimulations(records.len()));
    }
    Ok(records.iter().map(ComparisonRow::from).collect())
}
