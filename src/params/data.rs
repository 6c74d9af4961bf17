//! Simulation parameter records and the rules for reading them from forms

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Result, SimError};

/// Longest horizon any entry point will project: 50 years of monthly periods
pub const MAX_HORIZON: u32 = 600;

/// User-adjustable inputs for one projection
///
/// Costs and market size are currency amounts, `market_share` is a fraction
/// of the addressable market and `growth_rate` is a percentage per period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationParameters {
    /// One-time launch / initial cost, charged in full at period 0
    pub launch_cost: f64,

    /// Recurring operational cost before efficiency gains
    pub operational_cost: f64,

    /// Total addressable market size
    pub market_size: f64,

    /// Target market share, in [0, 1]
    pub market_share: f64,

    /// Growth rate in percent per period
    pub growth_rate: f64,

    /// Projection horizon in whole periods
    pub years: u32,
}

impl SimulationParameters {
    pub fn new(
        launch_cost: f64,
        operational_cost: f64,
        market_size: f64,
        market_share: f64,
        growth_rate: f64,
        years: u32,
    ) -> Self {
        Self {
            launch_cost,
            operational_cost,
            market_size,
            market_share,
            growth_rate,
            years,
        }
    }

    /// Check the domain invariants: share in [0, 1], horizon >= 1,
    /// non-negative costs and market size, all values finite
    pub fn validate(&self) -> Result<()> {
        for field in ParamField::ALL {
            let value = field.get(self);
            if !value.is_finite() {
                return Err(SimError::invalid(field.name(), format!("must be finite, got {}", value)));
            }
        }

        if self.launch_cost < 0.0 {
            return Err(SimError::invalid("launchCost", format!("must be >= 0, got {}", self.launch_cost)));
        }
        if self.operational_cost < 0.0 {
            return Err(SimError::invalid(
                "operationalCost",
                format!("must be >= 0, got {}", self.operational_cost),
            ));
        }
        if self.market_size < 0.0 {
            return Err(SimError::invalid("marketSize", format!("must be >= 0, got {}", self.market_size)));
        }
        if !(0.0..=1.0).contains(&self.market_share) {
            return Err(SimError::invalid(
                "marketShare",
                format!("must be within [0, 1], got {}", self.market_share),
            ));
        }
        if self.years < 1 {
            return Err(SimError::invalid("years", "horizon must be at least 1 period"));
        }

        Ok(())
    }

    /// Reject a horizon longer than `MAX_HORIZON`
    pub fn check_horizon(&self) -> Result<()> {
        if self.years > MAX_HORIZON {
            return Err(SimError::invalid(
                "years",
                format!("horizon must be at most {} periods, got {}", MAX_HORIZON, self.years),
            ));
        }
        Ok(())
    }

    /// Copy with every non-finite field read as 0 and the horizon capped at
    /// `MAX_HORIZON`, plus the fields that had to be replaced
    pub fn sanitized(&self) -> (Self, Vec<ParamField>) {
        let mut clean = *self;
        let mut replaced = Vec::new();

        for field in ParamField::ALL {
            let value = field.get(self);
            if !value.is_finite() {
                log::warn!("{} is {}; treating it as 0", field.name(), value);
                field.set(&mut clean, 0.0);
                replaced.push(field);
            }
        }
        if clean.years > MAX_HORIZON {
            log::warn!("horizon of {} periods capped at {}", clean.years, MAX_HORIZON);
            clean.years = MAX_HORIZON;
            replaced.push(ParamField::Years);
        }

        (clean, replaced)
    }

    /// Number of projected points, period 0 included
    pub fn point_count(&self) -> usize {
        self.years as usize + 1
    }
}

/// The fixed set of scalable numeric fields
///
/// Scenario rules and adjustment maps address parameters through this enum
/// rather than by inspecting record shapes at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParamField {
    LaunchCost,
    OperationalCost,
    MarketSize,
    MarketShare,
    GrowthRate,
    Years,
}

impl ParamField {
    pub const ALL: [ParamField; 6] = [
        ParamField::LaunchCost,
        ParamField::OperationalCost,
        ParamField::MarketSize,
        ParamField::MarketShare,
        ParamField::GrowthRate,
        ParamField::Years,
    ];

    /// External (camelCase) field name
    pub fn name(&self) -> &'static str {
        match self {
            ParamField::LaunchCost => "launchCost",
            ParamField::OperationalCost => "operationalCost",
            ParamField::MarketSize => "marketSize",
            ParamField::MarketShare => "marketShare",
            ParamField::GrowthRate => "growthRate",
            ParamField::Years => "years",
        }
    }

    /// Look up a field by its external name; `None` for unknown names
    pub fn from_name(name: &str) -> Option<Self> {
        ParamField::ALL.into_iter().find(|f| f.name() == name)
    }

    pub fn get(&self, params: &SimulationParameters) -> f64 {
        match self {
            ParamField::LaunchCost => params.launch_cost,
            ParamField::OperationalCost => params.operational_cost,
            ParamField::MarketSize => params.market_size,
            ParamField::MarketShare => params.market_share,
            ParamField::GrowthRate => params.growth_rate,
            ParamField::Years => params.years as f64,
        }
    }

    /// Write a value into the field.
    ///
    /// The horizon keeps only whole periods: fractional values are floored
    /// and negative or non-finite values become 0.
    pub fn set(&self, params: &mut SimulationParameters, value: f64) {
        match self {
            ParamField::LaunchCost => params.launch_cost = value,
            ParamField::OperationalCost => params.operational_cost = value,
            ParamField::MarketSize => params.market_size = value,
            ParamField::MarketShare => params.market_share = value,
            ParamField::GrowthRate => params.growth_rate = value,
            ParamField::Years => params.years = whole_periods(value),
        }
    }
}

fn whole_periods(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.floor().min(u32::MAX as f64) as u32
    } else {
        0
    }
}

/// Parse a form value leniently: surrounding whitespace is ignored and
/// anything that is not a number yields `None`
pub fn parse_lenient(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => parse_lenient(&s),
        _ => None,
    }))
}

/// Parameters as they arrive from a partially filled form
///
/// Every field is optional and accepts numbers or numeric strings. Anything
/// else (null, empty text, words) deserializes as missing rather than
/// failing the whole record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawParameters {
    #[serde(default, deserialize_with = "lenient_number")]
    pub launch_cost: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub operational_cost: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub market_size: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub market_share: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub growth_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub years: Option<f64>,
}

/// Outcome of coercing a raw form into typed parameters
#[derive(Debug, Clone, PartialEq)]
pub struct Coerced {
    pub params: SimulationParameters,

    /// Fields that were missing or not finite and were read as 0
    pub coerced_fields: Vec<ParamField>,
}

impl Coerced {
    pub fn is_clean(&self) -> bool {
        self.coerced_fields.is_empty()
    }
}

impl RawParameters {
    fn raw(&self, field: ParamField) -> Option<f64> {
        match field {
            ParamField::LaunchCost => self.launch_cost,
            ParamField::OperationalCost => self.operational_cost,
            ParamField::MarketSize => self.market_size,
            ParamField::MarketShare => self.market_share,
            ParamField::GrowthRate => self.growth_rate,
            ParamField::Years => self.years,
        }
    }

    /// Read every field, treating missing, NaN and infinite values as 0.
    ///
    /// This is the documented fallback for half-filled forms: it never
    /// fails, and each field it had to replace is reported and logged.
    pub fn coerce(&self) -> Coerced {
        let mut params = SimulationParameters::new(0.0, 0.0, 0.0, 0.0, 0.0, 0);
        let mut coerced_fields = Vec::new();

        for field in ParamField::ALL {
            match self.raw(field) {
                Some(value) if value.is_finite() => field.set(&mut params, value),
                other => {
                    log::warn!("{} is {:?}; treating it as 0", field.name(), other);
                    field.set(&mut params, 0.0);
                    coerced_fields.push(field);
                }
            }
        }

        Coerced { params, coerced_fields }
    }
}

impl From<SimulationParameters> for RawParameters {
    fn from(params: SimulationParameters) -> Self {
        Self {
            launch_cost: Some(params.launch_cost),
            operational_cost: Some(params.operational_cost),
            market_size: Some(params.market_size),
            market_share: Some(params.market_share),
            growth_rate: Some(params.growth_rate),
            years: Some(params.years as f64),
        }
    }
}

/// Range of one interactive control
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldBounds {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl FieldBounds {
    const fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }
}

/// Slider ranges used by the interactive simulator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamBounds {
    pub launch_cost: FieldBounds,
    pub operational_cost: FieldBounds,
    pub market_size: FieldBounds,
    pub market_share: FieldBounds,
    pub growth_rate: FieldBounds,
    pub years: FieldBounds,
}

impl Default for ParamBounds {
    fn default() -> Self {
        Self {
            launch_cost: FieldBounds::new(10_000_000.0, 500_000_000.0, 10_000_000.0),
            operational_cost: FieldBounds::new(5_000_000.0, 200_000_000.0, 5_000_000.0),
            market_size: FieldBounds::new(50_000_000.0, 5_000_000_000.0, 50_000_000.0),
            market_share: FieldBounds::new(0.001, 0.25, 0.001),
            growth_rate: FieldBounds::new(5.0, 100.0, 5.0),
            years: FieldBounds::new(3.0, 15.0, 1.0),
        }
    }
}

impl ParamBounds {
    pub fn for_field(&self, field: ParamField) -> FieldBounds {
        match field {
            ParamField::LaunchCost => self.launch_cost,
            ParamField::OperationalCost => self.operational_cost,
            ParamField::MarketSize => self.market_size,
            ParamField::MarketShare => self.market_share,
            ParamField::GrowthRate => self.growth_rate,
            ParamField::Years => self.years,
        }
    }

    /// Pull every field into its control range
    pub fn clamp(&self, params: &SimulationParameters) -> SimulationParameters {
        let mut clamped = *params;
        for field in ParamField::ALL {
            let value = self.for_field(field).clamp(field.get(params));
            field.set(&mut clamped, value);
        }
        clamped
    }
}
