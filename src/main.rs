//! Venture Sim CLI
//!
//! Runs a projection for one business model and prints the period table,
//! aggregate metrics and viability

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};

use venture_sim::params::SimulationParameters;
use venture_sim::profile::{BusinessModelProfile, ProfileCatalog};
use venture_sim::projection::{GrowthMode, PeriodUnit, ProjectionConfig, ProjectionResult};
use venture_sim::scenario::{AbTest, Preset, Scenario, ScenarioOutcome, ScenarioRunner};
use venture_sim::viability::{classify, milestones};

#[derive(Parser, Debug)]
#[command(version, about)]
/// Deterministic business scenario projections
struct Cli {
    /// Business model title or slug
    #[arg(short, long, default_value = "zero-g-manufacturing")]
    model: String,

    /// Override the projection horizon
    #[arg(short, long)]
    years: Option<u32>,

    /// Apply a preset to the model defaults (best, worst, conservative)
    #[arg(short, long)]
    preset: Option<String>,

    /// Run the baseline and every preset side by side
    #[arg(long)]
    compare_presets: bool,

    /// Run an A/B ladder with this many variations (2 to 5)
    #[arg(long, value_name = "COUNT")]
    variations: Option<usize>,

    /// Drop the compounding growth multiplier from revenue
    #[arg(long)]
    penetration_only: bool,

    /// Label periods as months instead of years
    #[arg(long)]
    monthly: bool,

    /// Load business model profiles from a CSV file instead of the built-in catalog
    #[arg(long, value_name = "FILE")]
    profiles: Option<PathBuf>,

    /// Write the period table to a CSV file
    #[arg(long, value_name = "FILE")]
    csv: Option<PathBuf>,

    /// Print the full result as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// List the available business models and exit
    #[arg(long)]
    list_models: bool,
}

impl Cli {
    fn config(&self) -> ProjectionConfig {
        ProjectionConfig {
            growth_mode: if self.penetration_only {
                GrowthMode::PenetrationOnly
            } else {
                GrowthMode::Legacy
            },
            period_unit: if self.monthly { PeriodUnit::Month } else { PeriodUnit::Year },
            ..ProjectionConfig::default()
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let catalog = match &cli.profiles {
        Some(path) => ProfileCatalog::from_csv_path(path)
            .with_context(|| format!("Failed to load profiles from {}", path.display()))?,
        None => ProfileCatalog::builtin(),
    };

    if cli.list_models {
        list_models(&catalog);
        return Ok(());
    }

    let profile = catalog.get(&cli.model)?.clone();
    let mut base = profile.defaults;
    if let Some(years) = cli.years {
        base.years = years;
    }
    base.check_horizon()?;

    let runner = ScenarioRunner::with_config(profile, cli.config());

    if cli.compare_presets {
        let outcomes = runner.run_presets(&base);
        return print_outcomes(&outcomes, cli.json);
    }

    if let Some(count) = cli.variations {
        let test = AbTest::new("cli", runner.profile().title.clone(), &base, count);
        let outcomes = runner.run_ab_test(&test);
        return print_outcomes(&outcomes, cli.json);
    }

    let params = match &cli.preset {
        Some(text) => match Preset::parse(text) {
            Some(preset) => Scenario::from_preset(&base, preset).parameters,
            None => bail!("Unknown preset '{}' (expected best, worst or conservative)", text),
        },
        None => base,
    };

    params.check_horizon()?;
    let result = runner.run(&params);

    if let Some(path) = &cli.csv {
        write_points_csv(&result, path).with_context(|| format!("Failed to write {}", path.display()))?;
        log::info!("period table written to {}", path.display());
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(runner.profile(), &params, &result);
    }

    Ok(())
}

fn list_models(catalog: &ProfileCatalog) {
    for profile in catalog.iter() {
        println!("{:<28} {:<28} x{:.1} risk {:.0}%", profile.title, profile.slug(), profile.revenue_multiplier, profile.risk_factor);
        if !profile.description.is_empty() {
            println!("    {}", profile.description);
        }
    }
}

fn print_result(profile: &BusinessModelProfile, params: &SimulationParameters, result: &ProjectionResult) {
    println!("{}", profile.title);
    println!("{}\n", "=".repeat(profile.title.len()));
    println!("  Launch cost:      ${:.0}M", params.launch_cost / 1e6);
    println!("  Operational cost: ${:.0}M", params.operational_cost / 1e6);
    println!("  Market size:      ${:.0}M", params.market_size / 1e6);
    println!("  Market share:     {:.1}%", params.market_share * 100.0);
    println!("  Growth rate:      {:.0}%", params.growth_rate);
    println!("  Horizon:          {}\n", params.years);

    println!("{:>10} {:>16} {:>16} {:>16} {:>18} {:>12}", "Period", "Revenue", "Costs", "Profit", "Cumulative", "Penetration");
    println!("{}", "-".repeat(94));
    for point in &result.points {
        println!(
            "{:>10} {:>16.0} {:>16.0} {:>16.0} {:>18.0} {:>12.2}",
            point.label, point.revenue, point.costs, point.net_profit, point.cumulative_profit, point.market_penetration,
        );
    }

    let metrics = &result.metrics;
    println!("\nSummary:");
    println!("  Total Revenue: ${:.2}M", metrics.total_revenue / 1e6);
    println!("  Total Cost:    ${:.2}M", metrics.total_cost / 1e6);
    println!("  Net Profit:    ${:.2}M", metrics.net_profit / 1e6);
    println!("  ROI:           {:.1}%", metrics.roi);
    println!("  Profit Margin: {:.1}%", metrics.profit_margin);
    match metrics.break_even_period {
        Some(period) => println!("  Break-even:    period {}", period),
        None => println!("  Break-even:    not reached"),
    }
    match result.irr() {
        Some(irr) => println!("  IRR:           {:.2}%", irr * 100.0),
        None => println!("  IRR:           n/a"),
    }
    println!("  Viability:     {}", classify(metrics));

    let reached = milestones(&metrics.snapshot());
    if !reached.is_empty() {
        println!("\nMilestones:");
        for milestone in reached {
            println!("  {} ({:.1})", milestone.title(), milestone.current_value);
        }
    }
}

fn print_outcomes(outcomes: &[ScenarioOutcome], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(outcomes)?);
        return Ok(());
    }

    println!("{:<14} {:>16} {:>10} {:>10} {:>11} {:>15}", "Scenario", "Net Profit $M", "ROI %", "Margin %", "Break-even", "Viability");
    println!("{}", "-".repeat(82));
    for outcome in outcomes {
        let metrics = &outcome.result.metrics;
        let break_even = metrics
            .break_even_period
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<14} {:>16.1} {:>10.1} {:>10.1} {:>11} {:>15}",
            outcome.scenario.name,
            metrics.net_profit / 1e6,
            metrics.roi,
            metrics.profit_margin,
            break_even,
            outcome.viability.label(),
        );
    }
    Ok(())
}

fn write_points_csv(result: &ProjectionResult, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for point in &result.points {
        writer.serialize(point)?;
    }
    writer.flush()?;
    Ok(())
}
