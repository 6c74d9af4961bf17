//! What-if scenarios: derive modified parameter sets from a base and run
//! them through the projection engine
//!
//! Derivation is a pure copy-and-scale over the fixed `ParamField` set.
//! Nothing here re-runs projections implicitly; callers hand derived
//! parameters to a `ScenarioRunner` (or the engine) themselves.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::params::{ParamField, SimulationParameters};
use crate::profile::BusinessModelProfile;
use crate::projection::{ProjectionConfig, ProjectionEngine, ProjectionResult};
use crate::viability::{classify, Viability};

/// Per-field multipliers. Fields not listed are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, f64>")]
pub struct Adjustments(BTreeMap<ParamField, f64>);

impl Adjustments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: ParamField, multiplier: f64) -> Self {
        self.0.insert(field, multiplier);
        self
    }

    pub fn set(&mut self, field: ParamField, multiplier: f64) {
        self.0.insert(field, multiplier);
    }

    /// Build from external field names. Unknown names are dropped with a warning.
    pub fn from_named<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        let mut adjustments = Self::new();
        for (name, multiplier) in entries {
            match ParamField::from_name(name.as_ref()) {
                Some(field) => adjustments.set(field, multiplier),
                None => log::warn!("ignoring adjustment for unknown field '{}'", name.as_ref()),
            }
        }
        adjustments
    }

    pub fn get(&self, field: ParamField) -> Option<f64> {
        self.0.get(&field).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ParamField, f64)> + '_ {
        self.0.iter().map(|(f, m)| (*f, *m))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<BTreeMap<String, f64>> for Adjustments {
    fn from(named: BTreeMap<String, f64>) -> Self {
        Self::from_named(named)
    }
}

/// How a variant is derived from its base
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioRule {
    /// Multiply every numeric field by the same factor
    Uniform(f64),
    /// Multiply only the listed fields
    PerField(Adjustments),
}

/// Derive a new parameter set; `base` is left untouched.
///
/// The horizon scales to `floor(years * factor)`. A field that satisfied
/// its invariant in `base` is clamped back into range after scaling
/// (share within [0, 1], amounts non-negative, at least one period).
/// Non-finite multipliers are ignored.
pub fn derive_variant(base: &SimulationParameters, rule: &ScenarioRule) -> SimulationParameters {
    let mut derived = *base;

    match rule {
        ScenarioRule::Uniform(factor) => {
            for field in ParamField::ALL {
                scale_field(base, &mut derived, field, *factor);
            }
        }
        ScenarioRule::PerField(adjustments) => {
            for (field, multiplier) in adjustments.iter() {
                scale_field(base, &mut derived, field, multiplier);
            }
        }
    }

    derived
}

fn scale_field(base: &SimulationParameters, derived: &mut SimulationParameters, field: ParamField, multiplier: f64) {
    if !multiplier.is_finite() {
        log::warn!("ignoring non-finite multiplier {} for {}", multiplier, field.name());
        return;
    }

    let original = field.get(base);
    let scaled = original * multiplier;
    if !scaled.is_finite() {
        log::warn!("{} scaled by {} is not finite; treating it as 0", field.name(), multiplier);
        field.set(derived, 0.0);
        return;
    }
    let value = if in_domain(field, original) {
        clamp_to_domain(field, scaled)
    } else {
        scaled
    };
    field.set(derived, value);
}

fn in_domain(field: ParamField, value: f64) -> bool {
    match field {
        ParamField::MarketShare => (0.0..=1.0).contains(&value),
        ParamField::Years => value >= 1.0,
        ParamField::GrowthRate => value.is_finite(),
        _ => value >= 0.0,
    }
}

fn clamp_to_domain(field: ParamField, value: f64) -> f64 {
    match field {
        ParamField::MarketShare => value.clamp(0.0, 1.0),
        ParamField::Years => value.max(1.0),
        ParamField::GrowthRate => value,
        _ => value.max(0.0),
    }
}

/// Named uniform presets offered by the what-if planner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    BestCase,
    WorstCase,
    Conservative,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Preset::BestCase, Preset::WorstCase, Preset::Conservative];

    pub fn factor(&self) -> f64 {
        match self {
            Preset::BestCase => 1.3,
            Preset::WorstCase => 0.7,
            Preset::Conservative => 0.9,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Preset::BestCase => "Best Case",
            Preset::WorstCase => "Worst Case",
            Preset::Conservative => "Conservative",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Preset::BestCase => "+30% all parameters",
            Preset::WorstCase => "-30% all parameters",
            Preset::Conservative => "-10% all parameters",
        }
    }

    pub fn rule(&self) -> ScenarioRule {
        ScenarioRule::Uniform(self.factor())
    }

    /// Parse "best", "best-case", "Best Case", ...
    pub fn parse(text: &str) -> Option<Self> {
        let key: String = text.chars().filter(|c| c.is_ascii_alphanumeric()).collect::<String>().to_lowercase();
        match key.as_str() {
            "best" | "bestcase" => Some(Preset::BestCase),
            "worst" | "worstcase" => Some(Preset::WorstCase),
            "conservative" => Some(Preset::Conservative),
            _ => None,
        }
    }
}

/// A named derived parameter set. Not updated when its base changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub parameters: SimulationParameters,
}

impl Scenario {
    pub fn derive(
        name: impl Into<String>,
        description: impl Into<String>,
        base: &SimulationParameters,
        rule: &ScenarioRule,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: derive_variant(base, rule),
        }
    }

    pub fn from_preset(base: &SimulationParameters, preset: Preset) -> Self {
        Self::derive(preset.name(), preset.description(), base, &preset.rule())
    }

    /// The unmodified base, for side-by-side runs
    pub fn baseline(base: &SimulationParameters) -> Self {
        Self {
            name: "Baseline".to_string(),
            description: String::new(),
            parameters: *base,
        }
    }
}

/// Bounds on the number of A/B variations
pub const MIN_VARIATIONS: usize = 2;
pub const MAX_VARIATIONS: usize = 5;

/// Fields the A/B ladder scales: initial investment, recurring revenue
/// base and production cost
pub const LADDER_FIELDS: [ParamField; 3] = [ParamField::LaunchCost, ParamField::MarketSize, ParamField::OperationalCost];

/// Fixed 20%-step ladder: 0.8, 1.0, 1.2, 1.4, ...
pub fn variation_factor(index: usize) -> f64 {
    1.0 + (index as f64 * 0.2 - 0.2)
}

/// "Variation A", "Variation B", ...
pub fn variation_name(index: usize) -> String {
    let letter = (b'A' + (index % 26) as u8) as char;
    format!("Variation {}", letter)
}

/// Generate A/B test arms. `count` is clamped to 2..=5.
pub fn ab_variations(base: &SimulationParameters, count: usize) -> Vec<Scenario> {
    let count = count.clamp(MIN_VARIATIONS, MAX_VARIATIONS);

    (0..count)
        .map(|i| {
            let factor = variation_factor(i);
            let adjustments = LADDER_FIELDS
                .iter()
                .fold(Adjustments::new(), |acc, field| acc.with(*field, factor));
            Scenario::derive(
                variation_name(i),
                format!("{:+.0}% investment, revenue base and production cost", (factor - 1.0) * 100.0),
                base,
                &ScenarioRule::PerField(adjustments),
            )
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbTestStatus {
    Running,
    Completed,
}

/// An A/B test definition: a base parameter set and its generated arms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbTest {
    pub test_name: String,
    pub business_model: String,
    pub base_parameters: SimulationParameters,
    pub variations: Vec<Scenario>,
    pub status: AbTestStatus,
}

impl AbTest {
    pub fn new(
        test_name: impl Into<String>,
        business_model: impl Into<String>,
        base: &SimulationParameters,
        count: usize,
    ) -> Self {
        Self {
            test_name: test_name.into(),
            business_model: business_model.into(),
            base_parameters: *base,
            variations: ab_variations(base, count),
            status: AbTestStatus::Running,
        }
    }
}

/// Projection of one scenario with its viability label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioOutcome {
    pub scenario: Scenario,
    pub result: ProjectionResult,
    pub viability: Viability,
}

/// Runs parameter sets and scenarios for one business model
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new(BusinessModelProfile::space_tourism());
/// let base = runner.profile().defaults;
/// for outcome in runner.run_presets(&base) {
///     println!("{}: {}", outcome.scenario.name, outcome.viability);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    engine: ProjectionEngine,
    profile: BusinessModelProfile,
}

impl ScenarioRunner {
    /// Runner with the default projection configuration
    pub fn new(profile: BusinessModelProfile) -> Self {
        Self::with_config(profile, ProjectionConfig::default())
    }

    pub fn with_config(profile: BusinessModelProfile, config: ProjectionConfig) -> Self {
        Self {
            engine: ProjectionEngine::new(config),
            profile,
        }
    }

    pub fn run(&self, params: &SimulationParameters) -> ProjectionResult {
        self.engine.project(params, &self.profile)
    }

    pub fn run_scenario(&self, scenario: &Scenario) -> ScenarioOutcome {
        let result = self.run(&scenario.parameters);
        let viability = classify(&result.metrics);
        ScenarioOutcome {
            scenario: scenario.clone(),
            result,
            viability,
        }
    }

    /// Run several scenarios in parallel; output order follows input order
    pub fn run_scenarios(&self, scenarios: &[Scenario]) -> Vec<ScenarioOutcome> {
        log::info!("running {} scenarios for {}", scenarios.len(), self.profile.title);
        scenarios.par_iter().map(|s| self.run_scenario(s)).collect()
    }

    /// Baseline followed by every preset
    pub fn run_presets(&self, base: &SimulationParameters) -> Vec<ScenarioOutcome> {
        let scenarios: Vec<Scenario> = std::iter::once(Scenario::baseline(base))
            .chain(Preset::ALL.iter().map(|p| Scenario::from_preset(base, *p)))
            .collect();
        self.run_scenarios(&scenarios)
    }

    /// Run every arm of an A/B test
    pub fn run_ab_test(&self, test: &AbTest) -> Vec<ScenarioOutcome> {
        self.run_scenarios(&test.variations)
    }

    /// Project many parameter sets in parallel
    pub fn run_batch(&self, params: &[SimulationParameters]) -> Vec<ProjectionResult> {
        params.par_iter().map(|p| self.run(p)).collect()
    }

    pub fn profile(&self) -> &BusinessModelProfile {
        &self.profile
    }

    pub fn profile_mut(&mut self) -> &mut BusinessModelProfile {
        &mut self.profile
    }

    pub fn config(&self) -> &ProjectionConfig {
        self.engine.config()
    }
}
