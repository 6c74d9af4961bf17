//! Load named parameter sets from CSV
//!
//! Expected header:
//! `name,model,launchCost,operationalCost,marketSize,marketShare,growthRate,years`
//!
//! Numeric cells go through the same lenient coercion as form input, so a
//! blank cell reads as 0 and is logged rather than rejecting the file.

use csv::Reader;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::data::{parse_lenient, RawParameters, SimulationParameters};
use crate::error::Result;

/// One named row of inputs, tagged with the business model it belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    pub name: String,
    pub model: String,
    pub params: SimulationParameters,
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    name: String,
    model: String,
    #[serde(rename = "launchCost")]
    launch_cost: Option<String>,
    #[serde(rename = "operationalCost")]
    operational_cost: Option<String>,
    #[serde(rename = "marketSize")]
    market_size: Option<String>,
    #[serde(rename = "marketShare")]
    market_share: Option<String>,
    #[serde(rename = "growthRate")]
    growth_rate: Option<String>,
    years: Option<String>,
}

impl CsvRow {
    fn into_set(self) -> ParameterSet {
        let cell = |v: &Option<String>| v.as_deref().and_then(parse_lenient);
        let raw = RawParameters {
            launch_cost: cell(&self.launch_cost),
            operational_cost: cell(&self.operational_cost),
            market_size: cell(&self.market_size),
            market_share: cell(&self.market_share),
            growth_rate: cell(&self.growth_rate),
            years: cell(&self.years),
        };

        let coerced = raw.coerce();
        if !coerced.is_clean() {
            log::warn!(
                "parameter set '{}' had {} blank or non-numeric cells",
                self.name,
                coerced.coerced_fields.len()
            );
        }

        ParameterSet {
            name: self.name,
            model: self.model,
            params: coerced.params,
        }
    }
}

/// Load all parameter sets from a CSV file
pub fn load_parameter_sets<P: AsRef<Path>>(path: P) -> Result<Vec<ParameterSet>> {
    let reader = Reader::from_path(path)?;
    collect_sets(reader)
}

/// Load parameter sets from any reader (string buffer, request body, ...)
pub fn load_parameter_sets_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<ParameterSet>> {
    collect_sets(Reader::from_reader(reader))
}

fn collect_sets<R: std::io::Read>(mut reader: Reader<R>) -> Result<Vec<ParameterSet>> {
    let mut sets = Vec::new();
    for result in reader.deserialize() {
        let row: CsvRow = result?;
        sets.push(row.into_set());
    }
    Ok(sets)
}
