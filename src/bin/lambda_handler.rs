//! AWS Lambda handler for running business scenario projections
//!
//! Accepts a JSON request through a Lambda Function URL and returns the
//! projection, metrics, viability and any requested scenario runs.

use aws_lambda_events::event::lambda_function_urls::{LambdaFunctionUrlRequest, LambdaFunctionUrlResponse};
use aws_lambda_events::http::{header, HeaderMap, HeaderValue};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde::{Deserialize, Serialize};

use venture_sim::params::{ParamField, RawParameters, SimulationParameters};
use venture_sim::profile::ProfileCatalog;
use venture_sim::projection::{GrowthMode, MetricsSnapshot, ProjectionConfig, ProjectionResult};
use venture_sim::scenario::{AbTest, Adjustments, Preset, Scenario, ScenarioRule, ScenarioRunner};
use venture_sim::viability::{classify, milestones, Milestone, Viability};

/// Input for one projection request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationRequest {
    /// Business model title or slug
    pub model: String,

    /// Full parameter form; the model defaults when absent
    #[serde(default)]
    pub parameters: Option<RawParameters>,

    #[serde(default)]
    pub growth_mode: GrowthMode,

    /// Apply a named preset before projecting
    #[serde(default)]
    pub preset: Option<String>,

    /// Per-field multipliers applied after any preset
    #[serde(default)]
    pub adjustments: Option<Adjustments>,

    /// Also run the baseline and every preset
    #[serde(default)]
    pub compare_presets: bool,

    /// Also run an A/B ladder with this many variations
    #[serde(default)]
    pub variations: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioSummary {
    pub name: String,
    pub description: String,
    pub parameters: SimulationParameters,
    pub metrics: MetricsSnapshot,
    pub viability: Viability,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResponse {
    pub model: String,
    pub parameters: SimulationParameters,
    pub coerced_fields: Vec<ParamField>,
    pub projection: ProjectionResult,
    pub snapshot: MetricsSnapshot,
    pub viability: Viability,
    pub milestones: Vec<Milestone>,
    pub irr: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub scenarios: Vec<ScenarioSummary>,
    pub execution_time_ms: u64,
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

fn cors_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static("POST, OPTIONS"));
    headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("Content-Type"));
    headers
}

fn preflight_response() -> LambdaFunctionUrlResponse {
    LambdaFunctionUrlResponse {
        status_code: 200,
        headers: cors_headers(),
        body: None,
        is_base64_encoded: false,
        cookies: Vec::new(),
    }
}

fn json_response(status: i64, body: String) -> LambdaFunctionUrlResponse {
    let mut headers = cors_headers();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    LambdaFunctionUrlResponse {
        status_code: status,
        headers,
        body: Some(body),
        is_base64_encoded: false,
        cookies: Vec::new(),
    }
}

fn error_response(status: i64, message: &str) -> LambdaFunctionUrlResponse {
    let body = serde_json::to_string(&ErrorBody { error: message })
        .unwrap_or_else(|_| r#"{"error":"internal error"}"#.to_string());
    json_response(status, body)
}

/// A request that carries parameters is read as a complete form: blank or
/// unreadable fields become 0 and are reported. Without parameters the
/// model defaults are used.
fn resolve_parameters(defaults: SimulationParameters, raw: Option<&RawParameters>) -> (SimulationParameters, Vec<ParamField>) {
    match raw {
        Some(raw) => {
            let coerced = raw.coerce();
            (coerced.params, coerced.coerced_fields)
        }
        None => (defaults, Vec::new()),
    }
}

fn summarize(runner: &ScenarioRunner, scenarios: &[Scenario]) -> Vec<ScenarioSummary> {
    runner
        .run_scenarios(scenarios)
        .into_iter()
        .map(|outcome| ScenarioSummary {
            name: outcome.scenario.name,
            description: outcome.scenario.description,
            parameters: outcome.scenario.parameters,
            metrics: outcome.result.metrics.snapshot(),
            viability: outcome.viability,
        })
        .collect()
}

fn simulate(request: SimulationRequest, catalog: &ProfileCatalog) -> Result<SimulationResponse, String> {
    let start = std::time::Instant::now();

    let profile = catalog.get(&request.model).map_err(|e| e.to_string())?.clone();
    let (mut params, coerced_fields) = resolve_parameters(profile.defaults, request.parameters.as_ref());

    if let Some(text) = &request.preset {
        let preset = Preset::parse(text).ok_or_else(|| format!("Unknown preset '{}'", text))?;
        params = Scenario::from_preset(&params, preset).parameters;
    }
    if let Some(adjustments) = request.adjustments {
        params = Scenario::derive("Adjusted", "", &params, &ScenarioRule::PerField(adjustments)).parameters;
    }
    params.check_horizon().map_err(|e| e.to_string())?;

    let config = ProjectionConfig {
        growth_mode: request.growth_mode,
        ..ProjectionConfig::default()
    };
    let runner = ScenarioRunner::with_config(profile, config);
    let projection = runner.run(&params);
    let snapshot = projection.metrics.snapshot();

    let mut scenarios = Vec::new();
    if request.compare_presets {
        let presets: Vec<Scenario> = std::iter::once(Scenario::baseline(&params))
            .chain(Preset::ALL.iter().map(|p| Scenario::from_preset(&params, *p)))
            .collect();
        scenarios.extend(summarize(&runner, &presets));
    }
    if let Some(count) = request.variations {
        let test = AbTest::new("lambda", runner.profile().title.clone(), &params, count);
        scenarios.extend(summarize(&runner, &test.variations));
    }

    Ok(SimulationResponse {
        model: runner.profile().title.clone(),
        parameters: params,
        coerced_fields,
        viability: classify(&projection.metrics),
        milestones: milestones(&snapshot),
        irr: projection.irr(),
        snapshot,
        projection,
        scenarios,
        execution_time_ms: start.elapsed().as_millis() as u64,
    })
}

/// Lambda handler function
async fn handler(event: LambdaEvent<LambdaFunctionUrlRequest>) -> Result<LambdaFunctionUrlResponse, Error> {
    let payload = event.payload;

    if payload.request_context.http.method.as_deref() == Some("OPTIONS") {
        return Ok(preflight_response());
    }
    if payload.is_base64_encoded {
        return Ok(error_response(400, "Expected a JSON text body"));
    }

    let body = payload.body.unwrap_or_else(|| "{}".to_string());
    let request: SimulationRequest = match serde_json::from_str(&body) {
        Ok(r) => r,
        Err(e) => return Ok(error_response(400, &format!("Invalid JSON: {}", e))),
    };

    log::info!("projecting {} ({:?})", request.model, request.growth_mode);

    match simulate(request, &ProfileCatalog::builtin()) {
        Ok(result) => match serde_json::to_string(&result) {
            Ok(body) => Ok(json_response(200, body)),
            Err(e) => Ok(error_response(500, &format!("Failed to encode response: {}", e))),
        },
        Err(message) => Ok(error_response(400, &message)),
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use venture_sim::params::MAX_HORIZON;

    fn request(json: &str) -> SimulationRequest {
        serde_json::from_str(json).unwrap()
    }

    fn run(json: &str) -> Result<SimulationResponse, String> {
        simulate(request(json), &ProfileCatalog::builtin())
    }

    #[test]
    fn test_defaults_when_no_parameters_given() {
        let response = run(r#"{"model": "zero-g-manufacturing"}"#).unwrap();
        assert_eq!(response.model, "Zero-G Manufacturing");
        assert_eq!(response.parameters.years, 10);
        assert!(response.coerced_fields.is_empty());
        assert_eq!(response.snapshot.break_even_year, 3);
        assert_eq!(response.viability, Viability::HighlyViable);
        assert!(response.scenarios.is_empty());
    }

    #[test]
    fn test_parameters_are_read_as_a_complete_form() {
        let defaults = ProfileCatalog::builtin().get("Space Tourism").unwrap().defaults;
        let raw: RawParameters = serde_json::from_str(r#"{"launchCost": "2000000", "years": 4}"#).unwrap();

        let (params, coerced) = resolve_parameters(defaults, Some(&raw));
        assert_eq!(params.launch_cost, 2_000_000.0);
        assert_eq!(params.years, 4);
        assert_eq!(params.market_size, 0.0);
        assert_eq!(coerced.len(), 4);

        assert_eq!(resolve_parameters(defaults, None), (defaults, Vec::new()));
    }

    #[test]
    fn test_preset_applies_before_adjustments() {
        let response = run(
            r#"{"model": "Zero-G Manufacturing", "preset": "worst",
                "adjustments": {"launchCost": 2.0, "colour": 3.0}}"#,
        )
        .unwrap();
        // 100M * 0.7 * 2.0
        assert!((response.parameters.launch_cost - 140_000_000.0).abs() < 1e-3);
        assert_eq!(response.parameters.years, 7);
        assert!((response.parameters.operational_cost - 21_000_000.0).abs() < 1e-3);
    }

    #[test]
    fn test_scenario_runs() {
        let response = run(r#"{"model": "Satellite Services", "comparePresets": true, "variations": 3}"#).unwrap();
        let names: Vec<_> = response.scenarios.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Baseline", "Best Case", "Worst Case", "Conservative", "Variation A", "Variation B", "Variation C"]
        );
    }

    #[test]
    fn test_bad_requests_are_rejected() {
        assert!(run(r#"{"model": "asteroid mining"}"#).unwrap_err().contains("asteroid mining"));
        assert!(run(r#"{"model": "Space Tourism", "preset": "optimistic"}"#)
            .unwrap_err()
            .contains("optimistic"));

        let err = run(r#"{"model": "Space Tourism", "parameters": {"years": 1e12}}"#).unwrap_err();
        assert!(err.contains("years"), "{}", err);
        let err = run(r#"{"model": "Space Tourism", "adjustments": {"years": 1e9}}"#).unwrap_err();
        assert!(err.contains("years"), "{}", err);

        let at_limit = format!(r#"{{"model": "Space Tourism", "parameters": {{"years": {}}}}}"#, MAX_HORIZON);
        assert_eq!(run(&at_limit).unwrap().projection.points.len(), MAX_HORIZON as usize + 1);
    }

    #[test]
    fn test_overflowing_adjustment_stays_finite() {
        let response = run(r#"{"model": "Zero-G Manufacturing", "adjustments": {"marketSize": 1e300}}"#).unwrap();
        assert!(response.projection.metrics.roi.is_finite());
        assert!(response.projection.metrics.profit_margin.is_finite());
        assert_eq!(response.parameters.market_size, 0.0);
    }

    #[test]
    fn test_responses_carry_json_and_cors_headers() {
        let ok = json_response(200, "{}".to_string());
        assert_eq!(ok.headers.get(header::CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(ok.headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "*");

        let err = error_response(400, "bad \"input\"");
        assert_eq!(err.status_code, 400);
        let body: serde_json::Value = serde_json::from_str(err.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["error"], "bad \"input\"");

        let preflight = preflight_response();
        assert!(preflight.body.is_none());
        assert_eq!(preflight.headers.get(header::ACCESS_CONTROL_ALLOW_METHODS).unwrap(), "POST, OPTIONS");
    }
}
