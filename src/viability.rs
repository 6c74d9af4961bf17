//! Qualitative viability labels and milestone detection over projection metrics
//!
//! Both are annotations recomputed on demand; neither is stored as an
//! authoritative value.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::projection::{AggregateMetrics, MetricsSnapshot};

/// ROI (percent) a venture must exceed to be highly viable
pub const HIGHLY_VIABLE_ROI: f64 = 100.0;
/// Latest break-even period for a highly viable venture
pub const HIGHLY_VIABLE_BREAK_EVEN: u32 = 5;
/// ROI (percent) a venture must exceed to be viable
pub const VIABLE_ROI: f64 = 50.0;
/// Latest break-even period for a viable venture
pub const VIABLE_BREAK_EVEN: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Viability {
    HighlyViable,
    Viable,
    HighRisk,
}

impl Viability {
    pub fn label(&self) -> &'static str {
        match self {
            Viability::HighlyViable => "Highly Viable",
            Viability::Viable => "Viable",
            Viability::HighRisk => "High Risk",
        }
    }
}

impl fmt::Display for Viability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify from ROI and break-even period. Strict `>` on ROI, inclusive
/// `<=` on break-even; a break-even that was never reached is high risk.
pub fn classify_values(roi: f64, break_even: Option<u32>) -> Viability {
    match break_even {
        Some(period) if roi > HIGHLY_VIABLE_ROI && period <= HIGHLY_VIABLE_BREAK_EVEN => Viability::HighlyViable,
        Some(period) if roi > VIABLE_ROI && period <= VIABLE_BREAK_EVEN => Viability::Viable,
        _ => Viability::HighRisk,
    }
}

pub fn classify(metrics: &AggregateMetrics) -> Viability {
    classify_values(metrics.roi, metrics.break_even_period)
}

/// Classify a stored snapshot, reading its 0 break-even through
/// `MetricsSnapshot::break_even_period`
pub fn classify_snapshot(snapshot: &MetricsSnapshot) -> Viability {
    classify_values(snapshot.roi, snapshot.break_even_period())
}

/// Thresholds that trigger a milestone notification
pub const MILESTONE_ROI: f64 = 100.0;
pub const MILESTONE_PROFIT_MARGIN: f64 = 30.0;
pub const MILESTONE_BREAK_EVEN: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneKind {
    /// ROI at or above 100%
    RoiDoubled,
    /// Profit margin at or above 30%
    HealthyMargin,
    /// Break-even within the first three periods
    EarlyBreakEven,
}

/// A threshold a simulation has reached, with the values for the notice
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub kind: MilestoneKind,
    pub current_value: f64,
    pub threshold_value: f64,
}

impl Milestone {
    pub fn title(&self) -> &'static str {
        match self.kind {
            MilestoneKind::RoiDoubled => "ROI above 100%",
            MilestoneKind::HealthyMargin => "Profit margin above 30%",
            MilestoneKind::EarlyBreakEven => "Break-even within 3 years",
        }
    }

    /// Metric key as stored in result records
    pub fn metric_type(&self) -> &'static str {
        match self.kind {
            MilestoneKind::RoiDoubled => "roi",
            MilestoneKind::HealthyMargin => "profit_margin",
            MilestoneKind::EarlyBreakEven => "break_even_year",
        }
    }
}

/// Milestones reached by a stored result.
///
/// A stored break-even of 0 never counts: it cannot be told apart from
/// "not reached".
pub fn milestones(snapshot: &MetricsSnapshot) -> Vec<Milestone> {
    let mut reached = Vec::new();

    if snapshot.roi >= MILESTONE_ROI {
        reached.push(Milestone {
            kind: MilestoneKind::RoiDoubled,
            current_value: snapshot.roi,
            threshold_value: MILESTONE_ROI,
        });
    }
    if snapshot.profit_margin >= MILESTONE_PROFIT_MARGIN {
        reached.push(Milestone {
            kind: MilestoneKind::HealthyMargin,
            current_value: snapshot.profit_margin,
            threshold_value: MILESTONE_PROFIT_MARGIN,
        });
    }
    if snapshot.break_even_year > 0 && snapshot.break_even_year <= MILESTONE_BREAK_EVEN {
        reached.push(Milestone {
            kind: MilestoneKind::EarlyBreakEven,
            current_value: snapshot.break_even_year as f64,
            threshold_value: MILESTONE_BREAK_EVEN as f64,
        });
    }

    reached
}
