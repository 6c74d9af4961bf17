//! Projection engine for business scenario cash flows

mod state;
mod engine;
mod cashflows;
pub mod irr;

pub use state::ProjectionState;
pub use engine::{
    market_penetration, project, GrowthMode, PeriodFigures, PeriodUnit, ProjectionConfig, ProjectionEngine,
};
pub use cashflows::{finite_or_zero, round_half_up, round_to, AggregateMetrics, MetricsSnapshot, ProjectionPoint, ProjectionResult};
pub use irr::{annualize, internal_rate_of_return, net_present_value};
