//! Core projection engine: period-by-period revenue, cost and profit for one
//! parameter set under one business model profile

use serde::{Deserialize, Serialize};

use super::cashflows::{finite_or_zero, round_half_up, round_to, AggregateMetrics, ProjectionPoint, ProjectionResult};
use super::state::ProjectionState;
use crate::params::SimulationParameters;
use crate::profile::BusinessModelProfile;

/// How the growth rate feeds into revenue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthMode {
    /// Growth drives both the S-curve penetration and a separate
    /// `(1 + g/100)^t` compounding multiplier. Matches every stored result.
    #[default]
    Legacy,
    /// Growth drives the S-curve only
    PenetrationOnly,
}

/// Unit of one projection period. Rates are always read per period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodUnit {
    #[default]
    Year,
    Month,
}

impl PeriodUnit {
    pub fn label(&self, period: u32) -> String {
        match self {
            PeriodUnit::Year => format!("Year {}", period),
            PeriodUnit::Month => format!("Month {}", period),
        }
    }

    pub fn periods_per_year(&self) -> u32 {
        match self {
            PeriodUnit::Year => 1,
            PeriodUnit::Month => 12,
        }
    }
}

/// Configuration for a projection run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionConfig {
    pub growth_mode: GrowthMode,

    pub period_unit: PeriodUnit,

    /// Share of the launch cost charged again in every period after 0
    pub maintenance_fraction: f64,

    /// Per-period multiplier on operational cost (economies of scale)
    pub operational_efficiency: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            growth_mode: GrowthMode::Legacy,
            period_unit: PeriodUnit::Year,
            maintenance_fraction: 0.30,
            operational_efficiency: 0.95,
        }
    }
}

/// Unrounded figures for one period
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodFigures {
    pub penetration: f64,
    pub revenue: f64,
    pub cost: f64,
}

/// Stateless projection engine. Safe to share across threads.
#[derive(Debug, Clone, Default)]
pub struct ProjectionEngine {
    config: ProjectionConfig,
}

impl ProjectionEngine {
    pub fn new(config: ProjectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Project periods 0..=years and derive the aggregate metrics.
    ///
    /// Never fails: degenerate inputs produce well-defined numbers (zero
    /// ratios for zero totals, no break-even when profit never turns
    /// positive). Non-finite fields are read as 0 and the horizon is capped
    /// at `MAX_HORIZON`; the result carries the parameters actually used.
    pub fn project(&self, params: &SimulationParameters, profile: &BusinessModelProfile) -> ProjectionResult {
        let (params, _) = params.sanitized();
        let mut result = ProjectionResult::new(profile.title.clone(), params);
        let mut state = ProjectionState::new();

        for period in 0..=params.years {
            let figures = self.period_figures(&params, profile, period);
            state.record(period, figures.revenue, figures.cost);
            result.add_point(self.point(period, &figures, &state));
        }

        result.metrics =
            AggregateMetrics::from_totals(state.cumulative_revenue, state.cumulative_cost, state.break_even);

        log::debug!(
            "projected {} over {} periods: roi={:.1}% break_even={:?}",
            profile.title,
            result.points.len(),
            result.metrics.roi,
            result.metrics.break_even_period
        );

        result
    }

    /// Revenue and cost for a single period. Overflow reads as 0.
    pub fn period_figures(
        &self,
        params: &SimulationParameters,
        profile: &BusinessModelProfile,
        period: u32,
    ) -> PeriodFigures {
        let t = period as f64;

        // S-curve towards the target share; stays at 0 when growth is 0
        let penetration = market_penetration(params, period);
        let base_revenue = params.market_size * penetration * profile.revenue_multiplier;

        let compounding = match self.config.growth_mode {
            GrowthMode::Legacy => (1.0 + params.growth_rate / 100.0).powf(t),
            GrowthMode::PenetrationOnly => 1.0,
        };
        let revenue = base_revenue * compounding * profile.risk_retention();

        let launch_component = if period == 0 {
            params.launch_cost
        } else {
            params.launch_cost * self.config.maintenance_fraction
        };
        let operational = params.operational_cost * self.config.operational_efficiency.powf(t);

        PeriodFigures {
            penetration: finite_or_zero(penetration),
            revenue: finite_or_zero(revenue),
            cost: finite_or_zero(launch_component + operational),
        }
    }

    fn point(&self, period: u32, figures: &PeriodFigures, state: &ProjectionState) -> ProjectionPoint {
        ProjectionPoint {
            period,
            label: self.config.period_unit.label(period),
            revenue: round_half_up(figures.revenue),
            costs: round_half_up(figures.cost),
            net_profit: round_half_up(finite_or_zero(figures.revenue - figures.cost)),
            cumulative_profit: round_half_up(finite_or_zero(state.cumulative_profit())),
            market_penetration: round_to(figures.penetration, 2),
        }
    }
}

/// Captured market fraction at a period: `share * (1 - e^(-g * t / 100))`
pub fn market_penetration(params: &SimulationParameters, period: u32) -> f64 {
    params.market_share * (1.0 - (-params.growth_rate * period as f64 / 100.0).exp())
}

/// Project with the default configuration
pub fn project(params: &SimulationParameters, profile: &BusinessModelProfile) -> ProjectionResult {
    ProjectionEngine::default().project(params, profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::MAX_HORIZON;
    use approx::assert_relative_eq;

    fn zero_g() -> (SimulationParameters, BusinessModelProfile) {
        let profile = BusinessModelProfile::zero_g_manufacturing();
        (profile.defaults, profile)
    }

    #[test]
    fn test_point_count_is_horizon_plus_one() {
        let (mut params, profile) = zero_g();
        for years in [1, 3, 10, 15] {
            params.years = years;
            assert_eq!(project(&params, &profile).points.len(), years as usize + 1);
        }
        params.years = 0;
        assert_eq!(project(&params, &profile).points.len(), 1);
    }

    #[test]
    fn test_zero_g_reference_run() {
        let (params, profile) = zero_g();
        let result = project(&params, &profile);

        assert_eq!(result.model, "Zero-G Manufacturing");
        assert_eq!(result.points.len(), 11);

        let first = &result.points[0];
        assert_eq!(first.label, "Year 0");
        assert_eq!(first.revenue, 0.0);
        assert_eq!(first.costs, 130_000_000.0);
        assert_eq!(first.net_profit, -130_000_000.0);
        assert_eq!(first.market_penetration, 0.0);

        let p1 = &result.points[1];
        assert_eq!(p1.revenue, 48_797_340.0);
        assert_eq!(p1.costs, 58_500_000.0);
        assert_eq!(p1.cumulative_profit, -139_702_660.0);
        assert_eq!(p1.market_penetration, 0.02);

        assert_eq!(result.points[3].cumulative_profit, 55_566_002.0);

        let m = &result.metrics;
        assert!(m.total_revenue >= 0.0);
        assert_eq!(m.break_even_period, Some(3));
        assert_eq!(m.break_even_year(), 3);
        assert_relative_eq!(m.total_revenue, 8_080_644_516.975, max_relative = 1e-9);
        assert_relative_eq!(m.total_cost, 658_719_944.634, max_relative = 1e-9);
        assert_relative_eq!(m.roi, 1126.719, epsilon = 1e-3);
        assert_relative_eq!(m.profit_margin, 91.848, epsilon = 1e-3);
    }

    #[test]
    fn test_penetration_only_mode_drops_compounding() {
        let (params, profile) = zero_g();
        let engine = ProjectionEngine::new(ProjectionConfig {
            growth_mode: GrowthMode::PenetrationOnly,
            ..Default::default()
        });
        let result = engine.project(&params, &profile);

        assert_relative_eq!(result.metrics.total_revenue, 940_742_943.548, max_relative = 1e-9);
        assert_eq!(result.metrics.break_even_period, Some(6));
        // Costs do not depend on the growth mode
        assert_relative_eq!(result.metrics.total_cost, project(&params, &profile).metrics.total_cost);
    }

    #[test]
    fn test_zero_growth_keeps_penetration_at_zero() {
        let (mut params, profile) = zero_g();
        params.growth_rate = 0.0;
        let result = project(&params, &profile);

        assert!(result.points.iter().all(|p| p.market_penetration == 0.0 && p.revenue == 0.0));
        assert_eq!(result.metrics.total_revenue, 0.0);
        assert_eq!(result.metrics.profit_margin, 0.0);
        assert_eq!(result.metrics.break_even_period, None);
    }

    #[test]
    fn test_zero_costs_give_zero_roi() {
        let (mut params, profile) = zero_g();
        params.launch_cost = 0.0;
        params.operational_cost = 0.0;
        let result = project(&params, &profile);

        assert_eq!(result.metrics.total_cost, 0.0);
        assert_eq!(result.metrics.roi, 0.0);
        assert!(result.metrics.profit_margin.is_finite());
    }

    #[test]
    fn test_all_zero_inputs_stay_finite() {
        let params = SimulationParameters::new(0.0, 0.0, 0.0, 0.0, 0.0, 5);
        let result = project(&params, &BusinessModelProfile::bare("empty", 1.0, 0.0));

        assert_eq!(result.metrics, AggregateMetrics::from_totals(0.0, 0.0, None));
        assert!(result.points.iter().all(|p| p.cumulative_profit == 0.0));
    }

    #[test]
    fn test_costs_decay_after_launch() {
        let params = SimulationParameters::new(100.0, 1000.0, 0.0, 0.0, 0.0, 3);
        let engine = ProjectionEngine::default();
        let profile = BusinessModelProfile::bare("costs", 1.0, 0.0);

        let costs: Vec<f64> = (0..=3).map(|t| engine.period_figures(&params, &profile, t).cost).collect();
        assert_relative_eq!(costs[0], 1100.0);
        assert_relative_eq!(costs[1], 30.0 + 950.0);
        assert_relative_eq!(costs[2], 30.0 + 902.5);
        assert_relative_eq!(costs[3], 30.0 + 857.375);
    }

    #[test]
    fn test_longer_horizon_never_lowers_revenue() {
        let (mut params, profile) = zero_g();
        let mut previous = 0.0;
        for years in 1..=15 {
            params.years = years;
            let total = project(&params, &profile).metrics.total_revenue;
            assert!(total >= previous, "revenue fell at {} years", years);
            previous = total;
        }
    }

    #[test]
    fn test_projection_is_repeatable() {
        let (params, profile) = zero_g();
        let engine = ProjectionEngine::default();
        let first = engine.project(&params, &profile);
        let second = engine.project(&params, &profile);
        assert_eq!(first, second);
        assert_eq!(first.metrics.roi.to_bits(), second.metrics.roi.to_bits());
    }

    #[test]
    fn test_monthly_labels() {
        let (mut params, profile) = zero_g();
        params.years = 12;
        let engine = ProjectionEngine::new(ProjectionConfig {
            period_unit: PeriodUnit::Month,
            ..Default::default()
        });
        let result = engine.project(&params, &profile);
        assert_eq!(result.points[12].label, "Month 12");
        assert_eq!(result.points[12].period, 12);
    }

    fn assert_all_finite(result: &ProjectionResult) {
        let m = &result.metrics;
        for value in [m.total_revenue, m.total_cost, m.net_profit, m.roi, m.profit_margin] {
            assert!(value.is_finite(), "{:?}", m);
        }
        for p in &result.points {
            for value in [p.revenue, p.costs, p.net_profit, p.cumulative_profit, p.market_penetration] {
                assert!(value.is_finite(), "{:?}", p);
            }
        }
    }

    #[test]
    fn test_non_finite_fields_read_as_zero() {
        let (mut params, profile) = zero_g();
        params.growth_rate = f64::NAN;
        let result = project(&params, &profile);

        assert_all_finite(&result);
        assert_eq!(result.params.growth_rate, 0.0);
        params.growth_rate = 0.0;
        assert_eq!(result.metrics, project(&params, &profile).metrics);

        let (mut params, profile) = zero_g();
        params.market_size = f64::INFINITY;
        params.launch_cost = f64::NEG_INFINITY;
        let result = project(&params, &profile);
        assert_all_finite(&result);
        assert_eq!(result.metrics.total_revenue, 0.0);
    }

    #[test]
    fn test_extreme_finite_inputs_stay_finite() {
        let (mut params, profile) = zero_g();
        params.market_size = 1e300;
        params.growth_rate = 5000.0;
        assert_all_finite(&project(&params, &profile));

        params.growth_rate = -1e6;
        assert_all_finite(&project(&params, &profile));
    }

    #[test]
    fn test_horizon_is_capped() {
        let (mut params, profile) = zero_g();
        params.years = u32::MAX;
        let result = project(&params, &profile);
        assert_eq!(result.points.len(), MAX_HORIZON as usize + 1);
        assert_eq!(result.params.years, MAX_HORIZON);
        assert_all_finite(&result);
    }

    #[test]
    fn test_profit_series_has_irr() {
        let (params, profile) = zero_g();
        let result = project(&params, &profile);
        let irr = result.irr().expect("profit series changes sign");
        assert!(irr > 0.0);
        assert!(result.npv(irr).abs() < 1e-6 * result.metrics.total_revenue);
    }
}
