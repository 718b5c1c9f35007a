//! `valore-sim`: invariant checks, overview export and live streaming for
//! the VALORE engine.
//!
//! Exit status is 0 when every scenario run passes, 1 on any failure or
//! stream error, 2 on invalid settings.

use clap::Parser;
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use valore_core::{build_overview, Engine, EngineRegistry};
use valore_env::{Settings, WallClock};
use valore_sim::scenarios::ScenarioId;
use valore_sim::{
    RunExport, ScenarioResult, ScenarioRunner, SimError, StreamConfig, StreamDriver,
    MAX_INTERVAL_SCALE,
};

#[derive(Parser, Debug)]
#[command(name = "valore-sim", version)]
#[command(about = "Check engine invariants across seeds, export the overview or stream updates")]
struct Args {
    /// Base seed (0 = from time; defaults to SIM_SYNTHETIC_SEED)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Scenario name (e.g. range_bands) or `all`
    #[arg(short = 'S', long, default_value = "all")]
    scenario: String,

    /// Consecutive seeds to check, starting at the base seed
    #[arg(long, default_value_t = 1)]
    seeds: u64,

    /// Advances per scenario
    #[arg(short, long, default_value_t = 30)]
    ticks: u64,

    #[arg(short, long)]
    verbose: bool,

    /// Print results as one JSON document on stdout
    #[arg(long)]
    json: bool,

    /// Write the base seed's overview and all results to this file
    #[arg(long, value_name = "PATH")]
    export: Option<String>,

    /// Stream the timeline and live updates for an organization
    #[arg(long, value_name = "ORGANIZATION")]
    stream: Option<String>,

    /// Updates to stream before stopping (default: until interrupted)
    #[arg(long)]
    updates: Option<u64>,

    /// Multiplier for stream delays (0 = no waiting)
    #[arg(long, default_value_t = 1.0, value_parser = parse_interval_scale)]
    interval_scale: f64,
}

fn parse_interval_scale(raw: &str) -> Result<f64, String> {
    let scale: f64 = raw.parse().map_err(|e| format!("{}", e))?;
    if scale.is_finite() && (0.0..=MAX_INTERVAL_SCALE).contains(&scale) {
        Ok(scale)
    } else {
        Err(format!("must be between 0 and {}", MAX_INTERVAL_SCALE))
    }
}

fn time_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

fn parse_scenarios(selection: &str) -> Result<Vec<ScenarioId>, String> {
    if selection == "all" {
        return Ok(ScenarioId::all());
    }
    selection.parse().map(|scenario| vec![scenario]).map_err(|e| {
        let names: Vec<&str> = ScenarioId::all().iter().map(|s| s.name()).collect();
        format!("{} (expected one of: {}, all)", e, names.join(", "))
    })
}

async fn stream(seed: u64, organization_id: &str, args: &Args) -> Result<(), SimError> {
    let mut engine = Engine::with_context(seed, WallClock::shared());
    let mut config = StreamConfig::new(organization_id).with_interval_scale(args.interval_scale);
    if let Some(updates) = args.updates {
        config = config.with_updates(updates);
    }

    let summary = StreamDriver::new(&mut engine, config)
        .run(|message| {
            println!("{}", serde_json::to_string(&message)?);
            Ok(())
        })
        .await?;
    info!(
        timeline_events = summary.timeline_events,
        updates = summary.updates,
        "stream finished"
    );
    Ok(())
}

fn check_seeds(base_seed: u64, scenarios: &[ScenarioId], args: &Args) -> Vec<ScenarioResult> {
    let mut results = Vec::new();
    for seed in (0..args.seeds).map(|offset| base_seed.wrapping_add(offset)) {
        let runner = ScenarioRunner::new(seed).with_ticks(args.ticks);
        for &scenario in scenarios {
            let result = runner.run(scenario);
            match &result.failure_reason {
                None => info!(%scenario, seed, ticks = result.total_ticks, "pass"),
                Some(reason) => error!(%scenario, seed, "fail: {}", reason),
            }
            results.push(result);
        }
    }
    results
}

fn export(
    path: &str,
    base_seed: u64,
    settings: &Settings,
    args: &Args,
    results: &[ScenarioResult],
) -> Result<(), SimError> {
    let mut registry = EngineRegistry::from_settings(settings);
    let engine = registry.get_or_create(Some(base_seed));
    let mut export = RunExport::new(&args.scenario, base_seed, build_overview(engine));
    for result in results {
        export.add_result(result.clone());
    }
    export.write_to_file(path)?;
    info!(
        path,
        results = export.results.len(),
        organizations = export.overview.organizations.len(),
        "export written"
    );
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("tracing subscriber already set: {}", e);
    }

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("invalid settings: {}", e);
            return ExitCode::from(2);
        }
    };

    let base_seed = match args.seed.or(settings.synthetic_seed) {
        Some(0) | None => time_seed(),
        Some(seed) => seed,
    };
    info!(seed = base_seed, data_mode = ?settings.data_mode, "valore-sim {}", env!("CARGO_PKG_VERSION"));

    if let Some(organization_id) = &args.stream {
        if !settings.data_mode.is_synthetic() {
            error!(data_mode = ?settings.data_mode, "streaming needs a synthetic data mode");
            return ExitCode::FAILURE;
        }
        return match stream(base_seed, organization_id, &args).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!("stream failed: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    let scenarios = match parse_scenarios(&args.scenario) {
        Ok(scenarios) => scenarios,
        Err(e) => {
            eprintln!("invalid scenario: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let results = check_seeds(base_seed, &scenarios, &args);
    let failed: Vec<&ScenarioResult> = results.iter().filter(|r| !r.passed).collect();

    if let Some(path) = &args.export {
        if !settings.data_mode.is_synthetic() {
            warn!(data_mode = ?settings.data_mode, "no synthetic overview to export");
        } else if let Err(e) = export(path, base_seed, &settings, &args, &results) {
            error!("export failed: {}", e);
            return ExitCode::FAILURE;
        }
    }

    if args.json {
        let report = serde_json::json!({
            "seed": base_seed,
            "runs": results.len(),
            "failed": failed.len(),
            "results": results,
        });
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("cannot encode report: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else if failed.is_empty() {
        info!(runs = results.len(), "all invariants held");
    } else {
        error!(runs = results.len(), failed = failed.len(), "invariant violations");
        for result in &failed {
            error!(
                scenario = %result.scenario,
                seed = result.seed,
                "{}",
                result.failure_reason.as_deref().unwrap_or("unknown")
            );
        }
    }

    if failed.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_scale_parser_rejects_non_finite() {
        assert_eq!(parse_interval_scale("0.25"), Ok(0.25));
        assert_eq!(parse_interval_scale("0"), Ok(0.0));
        assert!(parse_interval_scale("inf").is_err());
        assert!(parse_interval_scale("NaN").is_err());
        assert!(parse_interval_scale("-1").is_err());
        assert!(parse_interval_scale("1e9").is_err());
        assert!(parse_interval_scale("fast").is_err());
    }

    #[test]
    fn test_scenario_selection() {
        assert_eq!(parse_scenarios("all").unwrap().len(), ScenarioId::all().len());
        assert_eq!(parse_scenarios("range_bands").unwrap(), vec![ScenarioId::RangeBands]);
        assert!(parse_scenarios("split_brain").unwrap_err().contains("range_bands"));
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from(["valore-sim", "--stream", "kansas_mbb", "--interval-scale", "0"])
            .unwrap();
        assert_eq!(args.stream.as_deref(), Some("kansas_mbb"));
        assert_eq!(args.interval_scale, 0.0);
        assert!(Args::try_parse_from(["valore-sim", "--interval-scale", "inf"]).is_err());
    }
}
