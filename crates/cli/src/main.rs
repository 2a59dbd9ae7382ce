use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};

use laborshift_core::{ScenarioName, TargetPeriod, normalize_batch};
use laborshift_engine::{ImpactPipeline, ImpactRequest};

mod input;

#[derive(Parser)]
#[command(name = "laborshift", version, about = "AI labor-market impact engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the impact report for one period.
    Run(RunArgs),
    /// Normalize raw occupation codes and print the result.
    Normalize(NormalizeArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Occupation rate snapshot (JSON)
    #[arg(long, value_name = "PATH")]
    occupations: PathBuf,
    /// Industry employment snapshot (JSON)
    #[arg(long, value_name = "PATH")]
    employment: PathBuf,
    /// Job-posting signals (JSON)
    #[arg(long, value_name = "PATH")]
    signals: Option<PathBuf>,
    /// Model configuration (JSON); built-in defaults when omitted
    #[arg(long, value_name = "PATH", env = "LABORSHIFT_CONFIG")]
    config: Option<PathBuf>,
    /// Target period, YYYY-MM
    #[arg(long)]
    period: TargetPeriod,
    /// Projection horizon in years
    #[arg(long, default_value_t = 5)]
    years: u32,
    /// Scenario to project (repeatable; all configured scenarios when omitted)
    #[arg(long = "scenario", value_name = "NAME")]
    scenarios: Vec<String>,
    /// Monte Carlo seed; enables confidence bands
    #[arg(long)]
    seed: Option<u64>,
    /// Monte Carlo trial count (default from config)
    #[arg(long, requires = "seed")]
    trials: Option<usize>,
    /// Write the report here instead of stdout
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,
    /// Pretty-print the JSON report
    #[arg(long)]
    pretty: bool,
}

#[derive(Args)]
struct NormalizeArgs {
    /// Raw occupation codes
    #[arg(required = true)]
    codes: Vec<String>,
}

fn main() -> Result<()> {
    laborshift_observability::init();
    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => run(args),
        Commands::Normalize(args) => normalize(args),
    }
}

fn build_request(args: &RunArgs) -> Result<ImpactRequest> {
    let rates = input::occupations(&args.occupations)?;
    let employment = input::employment(&args.employment)?;

    let scenarios = args.scenarios.iter().map(ScenarioName::new).collect();
    let mut request = ImpactRequest::new(args.period, rates, employment).with_projection(args.years, scenarios);
    if let Some(path) = &args.signals {
        request = request.with_signals(input::signals(path)?);
    }
    if let Some(seed) = args.seed {
        request = request.with_simulation(args.years, seed);
        if let Some(trials) = args.trials {
            request = request.with_trials(trials);
        }
    }
    Ok(request)
}

fn run(args: RunArgs) -> Result<()> {
    let config = input::config(args.config.as_deref())?;
    let pipeline = ImpactPipeline::new(config).context("invalid model configuration")?;
    let request = build_request(&args)?;

    let report = pipeline
        .run(&request)
        .with_context(|| format!("impact run for {} failed", args.period))?;
    if !report.validation.passed {
        warn!(
            errors = report.validation.errors().count(),
            "report failed validation; see the validation block"
        );
    }

    let json = if args.pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    }
    .context("serializing report")?;

    match &args.output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("writing report to {}", path.display()))?;
            info!(path = %path.display(), fingerprint = %report.fingerprint, "report written");
        }
        None => {
            let mut out = io::stdout().lock();
            writeln!(out, "{json}").context("writing report to stdout")?;
        }
    }
    Ok(())
}

fn normalize(args: NormalizeArgs) -> Result<()> {
    let report = normalize_batch(args.codes.iter().map(String::as_str));
    if !report.unrecognized.is_empty() {
        warn!(
            unrecognized = report.unrecognized.len(),
            success_ratio = report.success_ratio(),
            "some codes could not be normalized"
        );
    }
    let json = serde_json::to_string_pretty(&report).context("serializing normalization report")?;
    writeln!(io::stdout().lock(), "{json}").context("writing to stdout")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_arguments() {
        let cli = Cli::try_parse_from([
            "laborshift",
            "run",
            "--occupations",
            "rates.json",
            "--employment",
            "ces.json",
            "--period",
            "2025-05",
            "--scenario",
            "moderate",
            "--scenario",
            "aggressive",
            "--seed",
            "9",
        ])
        .unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.period, TargetPeriod::new(2025, 5).unwrap());
        assert_eq!(args.years, 5);
        assert_eq!(args.scenarios, ["moderate", "aggressive"]);
        assert_eq!(args.seed, Some(9));
        assert!(!args.pretty);
    }

    #[test]
    fn rejects_malformed_period_and_orphan_trials() {
        let base = ["laborshift", "run", "--occupations", "a", "--employment", "b"];
        let bad_period = base.iter().copied().chain(["--period", "2025-13"]);
        assert!(Cli::try_parse_from(bad_period).is_err());

        let orphan = base.iter().copied().chain(["--period", "2025-01", "--trials", "10"]);
        assert!(Cli::try_parse_from(orphan).is_err());
    }

    #[test]
    fn normalize_requires_codes() {
        assert!(Cli::try_parse_from(["laborshift", "normalize"]).is_err());
        assert!(Cli::try_parse_from(["laborshift", "normalize", "15-1252.00", "bogus"]).is_ok());
    }
}
