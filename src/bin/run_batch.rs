//! Project every parameter set in a CSV file and write one summary row per set
//!
//! Environment:
//! - `SIM_INPUT`       parameter sets CSV (default `parameter_sets.csv`)
//! - `SIM_OUTPUT`      summary CSV (default `batch_summary.csv`)
//! - `SIM_GROWTH_MODE` `legacy` or `penetration_only` (default `legacy`)
//! - `SIM_PROFILES`    optional profiles CSV replacing the built-in catalog

use anyhow::{bail, Context, Result};
use rayon::prelude::*;
use serde::Serialize;
use std::env;
use std::path::Path;
use std::time::Instant;

use venture_sim::params::{load_parameter_sets, ParameterSet};
use venture_sim::profile::ProfileCatalog;
use venture_sim::projection::{GrowthMode, ProjectionConfig, ProjectionEngine};
use venture_sim::viability::classify;

#[derive(Debug, Serialize)]
struct SummaryRow {
    name: String,
    model: String,
    total_revenue: f64,
    total_costs: f64,
    net_profit: f64,
    roi: f64,
    break_even_year: u32,
    profit_margin: f64,
    irr: Option<f64>,
    viability: &'static str,
}

fn growth_mode_from_env() -> Result<GrowthMode> {
    match env::var("SIM_GROWTH_MODE") {
        Err(_) => Ok(GrowthMode::Legacy),
        Ok(value) => match value.trim().to_lowercase().as_str() {
            "" | "legacy" => Ok(GrowthMode::Legacy),
            "penetration_only" | "penetration-only" => Ok(GrowthMode::PenetrationOnly),
            other => bail!("SIM_GROWTH_MODE must be 'legacy' or 'penetration_only', got '{}'", other),
        },
    }
}

fn project_set(engine: &ProjectionEngine, catalog: &ProfileCatalog, set: &ParameterSet) -> Option<SummaryRow> {
    let profile = match catalog.get(&set.model) {
        Ok(profile) => profile,
        Err(e) => {
            log::warn!("skipping '{}': {}", set.name, e);
            return None;
        }
    };

    if let Err(e) = set.params.check_horizon() {
        log::warn!("skipping '{}': {}", set.name, e);
        return None;
    }

    let result = engine.project(&set.params, profile);
    let snapshot = result.metrics.snapshot();
    Some(SummaryRow {
        name: set.name.clone(),
        model: profile.title.clone(),
        total_revenue: snapshot.total_revenue,
        total_costs: snapshot.total_cost,
        net_profit: snapshot.net_profit,
        roi: snapshot.roi,
        break_even_year: snapshot.break_even_year,
        profit_margin: snapshot.profit_margin,
        irr: result.irr(),
        viability: classify(&result.metrics).label(),
    })
}

fn main() -> Result<()> {
    env_logger::init();

    let input = env::var("SIM_INPUT").unwrap_or_else(|_| "parameter_sets.csv".to_string());
    let output = env::var("SIM_OUTPUT").unwrap_or_else(|_| "batch_summary.csv".to_string());
    let config = ProjectionConfig {
        growth_mode: growth_mode_from_env()?,
        ..ProjectionConfig::default()
    };

    let catalog = match env::var("SIM_PROFILES") {
        Ok(path) => ProfileCatalog::from_csv_path(Path::new(&path))
            .with_context(|| format!("Failed to load profiles from {}", path))?,
        Err(_) => ProfileCatalog::builtin(),
    };

    let start = Instant::now();
    let sets = load_parameter_sets(&input).with_context(|| format!("Failed to load parameter sets from {}", input))?;
    log::info!("loaded {} parameter sets from {} in {:?}", sets.len(), input, start.elapsed());

    let engine = ProjectionEngine::new(config);
    let rows: Vec<SummaryRow> = sets
        .par_iter()
        .filter_map(|set| project_set(&engine, &catalog, set))
        .collect();

    let skipped = sets.len() - rows.len();
    if skipped > 0 {
        log::warn!("{} parameter sets were skipped", skipped);
    }

    let mut writer = csv::Writer::from_path(&output).with_context(|| format!("Failed to create {}", output))?;
    for row in &rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    log::info!("projected {} sets in {:?}", rows.len(), start.elapsed());
    println!("Wrote {} rows to {}", rows.len(), output);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use venture_sim::params::{SimulationParameters, MAX_HORIZON};

    fn set(model: &str, years: u32) -> ParameterSet {
        ParameterSet {
            name: format!("{}-{}", model, years),
            model: model.to_string(),
            params: SimulationParameters::new(100_000_000.0, 30_000_000.0, 1_500_000_000.0, 0.08, 35.0, years),
        }
    }

    #[test]
    fn test_project_set_summarises_known_models() {
        let engine = ProjectionEngine::default();
        let row = project_set(&engine, &ProfileCatalog::builtin(), &set("zero-g-manufacturing", 10)).unwrap();
        assert_eq!(row.model, "Zero-G Manufacturing");
        assert_eq!(row.break_even_year, 3);
        assert_eq!(row.viability, "Highly Viable");
    }

    #[test]
    fn test_unknown_models_and_long_horizons_are_skipped() {
        let engine = ProjectionEngine::default();
        let catalog = ProfileCatalog::builtin();
        assert!(project_set(&engine, &catalog, &set("asteroid mining", 10)).is_none());
        assert!(project_set(&engine, &catalog, &set("Space Tourism", MAX_HORIZON + 1)).is_none());
        assert!(project_set(&engine, &catalog, &set("Space Tourism", MAX_HORIZON)).is_some());
    }
}
