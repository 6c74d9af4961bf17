//! Business model profiles: static descriptions plus the two coefficients
//! the projection engine reads (revenue multiplier and risk factor)

pub mod loader;

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, SimError};
use crate::params::SimulationParameters;

/// Static per-model data. Supplied by the caller and never mutated by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessModelProfile {
    pub title: String,
    pub description: String,

    /// Indicative capital requirement, e.g. "$50M - $200M"
    pub investment_range: String,

    /// Indicative payback period, e.g. "5-7 years"
    pub payback_hint: String,

    pub challenges: Vec<String>,

    /// Starting parameters offered for this model
    pub defaults: SimulationParameters,

    /// Scales base revenue
    pub revenue_multiplier: f64,

    /// Percentage haircut applied to revenue (15 = 15%)
    pub risk_factor: f64,
}

impl BusinessModelProfile {
    /// Profile with only the engine coefficients set
    pub fn bare(title: impl Into<String>, revenue_multiplier: f64, risk_factor: f64) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            investment_range: String::new(),
            payback_hint: String::new(),
            challenges: Vec::new(),
            defaults: SimulationParameters::new(0.0, 0.0, 0.0, 0.0, 0.0, 1),
            revenue_multiplier,
            risk_factor,
        }
    }

    /// URL/CLI friendly identifier derived from the title
    pub fn slug(&self) -> String {
        slugify(&self.title)
    }

    /// Fraction of revenue kept after the risk haircut
    pub fn risk_retention(&self) -> f64 {
        1.0 - self.risk_factor / 100.0
    }

    pub fn zero_g_manufacturing() -> Self {
        Self {
            title: "Zero-G Manufacturing".to_string(),
            description: "Manufacturing of advanced materials, pharmaceuticals, and fiber optics in microgravity conditions."
                .to_string(),
            investment_range: "$50M - $200M".to_string(),
            payback_hint: "5-7 years".to_string(),
            challenges: vec![
                "Launch costs".to_string(),
                "Supply chain logistics".to_string(),
                "Quality control".to_string(),
            ],
            defaults: SimulationParameters::new(100_000_000.0, 30_000_000.0, 1_500_000_000.0, 0.08, 35.0, 10),
            revenue_multiplier: 1.2,
            risk_factor: 15.0,
        }
    }

    pub fn space_tourism() -> Self {
        Self {
            title: "Space Tourism".to_string(),
            description: "Suborbital and orbital tourism experiences for private customers and researchers.".to_string(),
            investment_range: "$100M - $500M".to_string(),
            payback_hint: "8-10 years".to_string(),
            challenges: vec![
                "Safety certification".to_string(),
                "Insurance costs".to_string(),
                "Market demand".to_string(),
            ],
            defaults: SimulationParameters::new(250_000_000.0, 80_000_000.0, 2_000_000_000.0, 0.05, 45.0, 10),
            revenue_multiplier: 1.5,
            risk_factor: 25.0,
        }
    }

    pub fn satellite_services() -> Self {
        Self {
            title: "Satellite Services".to_string(),
            description: "In-orbit servicing, repair, and refueling of existing satellite infrastructure.".to_string(),
            investment_range: "$20M - $80M".to_string(),
            payback_hint: "3-5 years".to_string(),
            challenges: vec![
                "Technical complexity".to_string(),
                "Regulatory approval".to_string(),
                "Debris mitigation".to_string(),
            ],
            defaults: SimulationParameters::new(50_000_000.0, 20_000_000.0, 800_000_000.0, 0.12, 28.0, 10),
            revenue_multiplier: 1.0,
            risk_factor: 10.0,
        }
    }
}

fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

/// Ordered collection of business model profiles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileCatalog {
    profiles: Vec<BusinessModelProfile>,
}

impl ProfileCatalog {
    /// The three low-Earth-orbit ventures offered by the simulator
    pub fn builtin() -> Self {
        Self {
            profiles: vec![
                BusinessModelProfile::zero_g_manufacturing(),
                BusinessModelProfile::space_tourism(),
                BusinessModelProfile::satellite_services(),
            ],
        }
    }

    pub fn new(profiles: Vec<BusinessModelProfile>) -> Self {
        Self { profiles }
    }

    /// Load profiles from a CSV file
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        Ok(Self::new(loader::load_profiles(path)?))
    }

    /// Find a profile by title (case-insensitive) or slug
    pub fn get(&self, name: &str) -> Result<&BusinessModelProfile> {
        let wanted = name.trim();
        self.profiles
            .iter()
            .find(|p| p.title.eq_ignore_ascii_case(wanted) || p.slug() == wanted)
            .ok_or_else(|| SimError::UnknownModel(wanted.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &BusinessModelProfile> {
        self.profiles.iter()
    }

    pub fn titles(&self) -> Vec<&str> {
        self.profiles.iter().map(|p| p.title.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl Default for ProfileCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
