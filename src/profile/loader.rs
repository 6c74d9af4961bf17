//! CSV-based profile loader
//!
//! Columns: `title,description,investmentRange,paybackHint,challenges,
//! revenueMultiplier,riskFactor,launchCost,operationalCost,marketSize,
//! marketShare,growthRate,years`. Challenges are separated by `;`.

use csv::Reader;
use serde::Deserialize;
use std::path::Path;

use super::BusinessModelProfile;
use crate::error::{Result, SimError};
use crate::params::SimulationParameters;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CsvRow {
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    investment_range: String,
    #[serde(default)]
    payback_hint: String,
    #[serde(default)]
    challenges: String,
    revenue_multiplier: f64,
    risk_factor: f64,
    launch_cost: f64,
    operational_cost: f64,
    market_size: f64,
    market_share: f64,
    growth_rate: f64,
    years: u32,
}

impl CsvRow {
    fn into_profile(self) -> Result<BusinessModelProfile> {
        if self.title.trim().is_empty() {
            return Err(SimError::EmptyName("profile"));
        }
        if !(0.0..=100.0).contains(&self.risk_factor) {
            return Err(SimError::invalid(
                "riskFactor",
                format!("must be a percentage in [0, 100], got {}", self.risk_factor),
            ));
        }

        let defaults = SimulationParameters::new(
            self.launch_cost,
            self.operational_cost,
            self.market_size,
            self.market_share,
            self.growth_rate,
            self.years,
        );
        defaults.validate()?;

        let challenges = self
            .challenges
            .split(';')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(String::from)
            .collect();

        Ok(BusinessModelProfile {
            title: self.title,
            description: self.description,
            investment_range: self.investment_range,
            payback_hint: self.payback_hint,
            challenges,
            defaults,
            revenue_multiplier: self.revenue_multiplier,
            risk_factor: self.risk_factor,
        })
    }
}

/// Load profiles from a CSV file
pub fn load_profiles(path: &Path) -> Result<Vec<BusinessModelProfile>> {
    load_profiles_from_reader(std::fs::File::open(path)?)
}

/// Load profiles from any reader
pub fn load_profiles_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<BusinessModelProfile>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut profiles = Vec::new();

    for result in csv_reader.deserialize() {
        let row: CsvRow = result?;
        profiles.push(row.into_profile()?);
    }

    log::debug!("loaded {} business model profiles", profiles.len());
    Ok(profiles)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "title,description,investmentRange,paybackHint,challenges,revenueMultiplier,riskFactor,launchCost,operationalCost,marketSize,marketShare,growthRate,years\n";

    #[test]
    fn test_load_profiles() {
        let csv = format!(
            "{}Lunar Logistics,Cargo to the Moon,$1B+,10+ years,Landers; Power ;,0.8,30,400000000,90000000,3000000000,0.04,20,12\n",
            HEADER
        );
        let profiles = load_profiles_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(profiles.len(), 1);

        let p = &profiles[0];
        assert_eq!(p.title, "Lunar Logistics");
        assert_eq!(p.challenges, vec!["Landers", "Power"]);
        assert_eq!(p.revenue_multiplier, 0.8);
        assert_eq!(p.defaults.years, 12);
    }

    #[test]
    fn test_rejects_bad_risk_factor() {
        let csv = format!("{}X,,,,,1.0,140,1,1,1,0.1,10,5\n", HEADER);
        let err = load_profiles_from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, SimError::InvalidParameter { field: "riskFactor", .. }));
    }

    #[test]
    fn test_rejects_invalid_defaults() {
        let csv = format!("{}X,,,,,1.0,10,1,1,1,1.5,10,5\n", HEADER);
        assert!(load_profiles_from_reader(csv.as_bytes()).is_err());
    }
}
