//! Venture Sim - deterministic financial projections for business scenarios
//!
//! This library provides:
//! - Multi-period projections (market penetration, compounding growth, cost decay, risk haircut)
//! - Aggregate metrics: ROI, break-even period, profit margin, IRR
//! - What-if scenarios, presets and A/B variation ladders
//! - Viability classification and milestone detection
//! - Comparison insights over stored simulations and a storage interface

pub mod error;
pub mod params;
pub mod profile;
pub mod projection;
pub mod scenario;
pub mod viability;
pub mod insights;
pub mod store;

// Re-export commonly used types
pub use error::{Result, SimError};
pub use params::{RawParameters, SimulationParameters};
pub use profile::{BusinessModelProfile, ProfileCatalog};
pub use projection::{AggregateMetrics, ProjectionConfig, ProjectionEngine, ProjectionPoint, ProjectionResult};
pub use scenario::{Preset, Scenario, ScenarioRule, ScenarioRunner};
pub use viability::{classify, Viability};
