//! Shorewatch CLI - transect-based shoreline change analysis

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use shorewatch_algorithms::analysis::{run_transect_analysis, transect_features, TransectAnalysis};
use shorewatch_algorithms::change::change_table;
use shorewatch_algorithms::forecast::{forecast_table, run_forecast, Forecast, ForecastParams};
use shorewatch_algorithms::timeseries::{long_form_table, TimeSeries};
use shorewatch_core::io::{
    load_epochs, read_json, write_geojson, write_json, write_text, GeoJsonDirectory,
    ShorelineSource,
};
use shorewatch_core::vector::total_length;
use shorewatch_core::{AnalysisConfig, ShorelineCache, ShorelineEpochs};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "shorewatch")]
#[command(author, version, about = "Transect-based shoreline change analysis", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarise a directory of shoreline_<year>.geojson files
    Info {
        /// Shoreline directory
        input: PathBuf,
    },
    /// Generate transects and compute change statistics
    Analyze {
        /// Shoreline directory
        input: PathBuf,
        /// Output directory
        output: PathBuf,
        #[command(flatten)]
        opts: ConfigArgs,
    },
    /// Assemble the long-form table and sequence tensor from an analysis
    Timeseries {
        /// analysis.json written by `analyze`
        analysis: PathBuf,
        /// Output directory
        output: PathBuf,
    },
    /// Forecast shoreline positions from an analysis
    Forecast {
        /// analysis.json written by `analyze`
        analysis: PathBuf,
        /// Output directory
        output: PathBuf,
        #[command(flatten)]
        opts: ConfigArgs,
    },
    /// Run analysis, time series and forecast in one go
    Run {
        /// Shoreline directory
        input: PathBuf,
        /// Output directory (transects/, timeseries/, forecast/ are created)
        output: PathBuf,
        #[command(flatten)]
        opts: ConfigArgs,
    },
}

/// Configuration file plus per-field overrides
#[derive(Args, Debug, Default)]
struct ConfigArgs {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Year whose shoreline anchors the transects
    #[arg(long)]
    reference_year: Option<i32>,
    /// Spacing between transects along the baseline
    #[arg(short, long)]
    spacing: Option<f64>,
    /// Transect length
    #[arg(short, long)]
    length: Option<f64>,
    /// Canonical years, comma separated
    #[arg(long, value_delimiter = ',')]
    years: Vec<i32>,
    /// Forecast years, comma separated
    #[arg(long, value_delimiter = ',')]
    forecast_years: Vec<i32>,
    /// Lookback window length
    #[arg(long)]
    lookback: Option<usize>,
    /// EPR deadband classified as stable
    #[arg(short, long)]
    threshold: Option<f64>,
    /// Predictor: auto, regression, linear
    #[arg(short, long)]
    predictor: Option<String>,
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn build_config(args: &ConfigArgs) -> Result<AnalysisConfig> {
    let mut config = match &args.config {
        Some(path) => AnalysisConfig::from_json_file(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?,
        None => AnalysisConfig::default(),
    };

    if let Some(y) = args.reference_year {
        config.reference_year = Some(y);
    }
    if let Some(s) = args.spacing {
        config.transect_spacing = s;
    }
    if let Some(l) = args.length {
        config.transect_length = l;
    }
    if !args.years.is_empty() {
        config.years = args.years.clone();
    }
    if !args.forecast_years.is_empty() {
        config.forecast_years = args.forecast_years.clone();
    }
    if let Some(n) = args.lookback {
        config.lookback = n;
    }
    if let Some(t) = args.threshold {
        config.stability_threshold = t;
    }
    if let Some(p) = &args.predictor {
        config.predictor = p.parse().context("Invalid predictor")?;
    }
    Ok(config)
}

fn load_shorelines(input: &Path, config: &AnalysisConfig) -> Result<ShorelineEpochs> {
    let pb = spinner("Reading shorelines...");
    let source = GeoJsonDirectory::new(input);
    let mut cache = ShorelineCache::new(config.cache_capacity);
    let epochs = load_epochs(&source, &config.canonical_years(), &mut cache)
        .with_context(|| format!("Failed to load shorelines from {}", input.display()))?;
    pb.finish_and_clear();
    info!("Loaded years: {:?}", epochs.keys().collect::<Vec<_>>());
    Ok(epochs)
}

fn read_analysis(path: &Path) -> Result<TransectAnalysis> {
    let pb = spinner("Reading analysis...");
    let analysis: TransectAnalysis = read_json(path)
        .with_context(|| format!("Failed to read analysis {}", path.display()))?;
    pb.finish_and_clear();
    info!(
        "Analysis: {} transects, {} change records",
        analysis.transects.len(),
        analysis.changes.len()
    );
    Ok(analysis)
}

fn analyze(input: &Path, output: &Path, config: &AnalysisConfig) -> Result<TransectAnalysis> {
    let epochs = load_shorelines(input, config)?;
    let start = Instant::now();
    let analysis =
        run_transect_analysis(&epochs, config).context("Transect analysis failed")?;
    let elapsed = start.elapsed();

    let pb = spinner("Writing outputs...");
    write_geojson(&transect_features(&analysis), output.join("transects.geojson"))
        .context("Failed to write transects")?;
    change_table(&analysis.changes, &analysis.years)
        .context("Failed to tabulate change statistics")?
        .write_csv(output.join("shoreline_change_stats.csv"))
        .context("Failed to write change statistics")?;
    write_text(analysis.report(), output.join("change_summary.txt"))
        .context("Failed to write summary")?;
    write_json(&analysis, output.join("analysis.json")).context("Failed to write analysis")?;
    pb.finish_and_clear();

    done("Transect analysis", output, elapsed);
    println!(
        "  Transects: {} ({} with change data)",
        analysis.transects.len(),
        analysis.changes.len()
    );
    Ok(analysis)
}

fn timeseries(analysis: &TransectAnalysis, output: &Path) -> Result<TimeSeries> {
    let start = Instant::now();
    let series = analysis.timeseries().context("Time-series assembly failed")?;
    let elapsed = start.elapsed();

    let pb = spinner("Writing outputs...");
    long_form_table(&series.long_form)
        .context("Failed to tabulate time series")?
        .write_csv(output.join("shoreline_timeseries.csv"))
        .context("Failed to write time series")?;
    write_json(&series.tensor, output.join("sequences.json"))
        .context("Failed to write sequences")?;
    pb.finish_and_clear();

    done("Time series", output, elapsed);
    let (rows, cols) = series.tensor.shape();
    println!("  Rows: {}, tensor: {} x {}", series.long_form.len(), rows, cols);
    Ok(series)
}

fn forecast(series: &TimeSeries, output: &Path, config: &AnalysisConfig) -> Result<Forecast> {
    let start = Instant::now();
    let result = run_forecast(series, &ForecastParams::from(config)).context("Forecast failed")?;
    let elapsed = start.elapsed();

    let pb = spinner("Writing outputs...");
    forecast_table(&result)
        .context("Failed to tabulate forecast")?
        .write_csv(output.join("shoreline_forecast.csv"))
        .context("Failed to write forecast")?;
    write_text(result.report(), output.join("forecast_summary.txt"))
        .context("Failed to write forecast summary")?;
    pb.finish_and_clear();

    done("Forecast", output, elapsed);
    println!(
        "  Predictor: {}, transects: {}",
        result.predictor,
        result.forecast_transects.len()
    );
    Ok(result)
}

fn done(name: &str, path: &Path, elapsed: std::time::Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match cli.command {
        // ── Info ─────────────────────────────────────────────────────
        Commands::Info { input } => {
            let source = GeoJsonDirectory::new(&input);
            let years = source
                .available_years()
                .with_context(|| format!("Failed to list {}", input.display()))?;

            println!("Directory: {}", input.display());
            println!("Years: {}", years.len());
            for year in years {
                match source.load_year(year).context("Failed to read shoreline")? {
                    Some(fragments) => println!(
                        "  {}: {} fragments, total length {:.2}",
                        year,
                        fragments.len(),
                        total_length(&fragments)
                    ),
                    None => println!("  {}: no usable fragments", year),
                }
            }
        }

        // ── Stages ───────────────────────────────────────────────────
        Commands::Analyze {
            input,
            output,
            opts,
        } => {
            let config = build_config(&opts)?;
            analyze(&input, &output, &config)?;
        }

        Commands::Timeseries { analysis, output } => {
            let analysis = read_analysis(&analysis)?;
            timeseries(&analysis, &output)?;
        }

        Commands::Forecast {
            analysis,
            output,
            opts,
        } => {
            let config = build_config(&opts)?;
            let analysis = read_analysis(&analysis)?;
            let series = analysis.timeseries().context("Time-series assembly failed")?;
            forecast(&series, &output, &config)?;
        }

        Commands::Run {
            input,
            output,
            opts,
        } => {
            let config = build_config(&opts)?;
            let start = Instant::now();
            let analysis = analyze(&input, &output.join("transects"), &config)?;
            let series = timeseries(&analysis, &output.join("timeseries"))?;
            forecast(&series, &output.join("forecast"), &config)?;
            println!("Pipeline finished in {:.2?}", start.elapsed());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shorewatch_core::PredictorKind;

    #[test]
    fn test_flag_overrides() {
        let cli = Cli::try_parse_from([
            "shorewatch",
            "analyze",
            "in",
            "out",
            "--spacing",
            "25",
            "--years",
            "2000,2010,2020",
            "--predictor",
            "linear",
        ])
        .unwrap();
        let Commands::Analyze { opts, .. } = cli.command else {
            panic!("expected analyze");
        };
        let cfg = build_config(&opts).unwrap();
        assert_eq!(cfg.transect_spacing, 25.0);
        assert_eq!(cfg.transect_length, 300.0);
        assert_eq!(cfg.years, vec![2000, 2010, 2020]);
        assert_eq!(cfg.predictor, PredictorKind::Linear);
    }

    #[test]
    fn test_unknown_predictor() {
        let opts = ConfigArgs {
            predictor: Some("lstm".into()),
            ..Default::default()
        };
        assert!(build_config(&opts).is_err());
    }
}
