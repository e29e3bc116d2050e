use chrono::{Datelike, Utc};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::debug;

use realty_risk::assess::{assess_composite, CompositeRequest};
use realty_risk::config::{Config, DataSourceMode};
use realty_risk::data_source::{DataSource, LiveDataSource, SyntheticDataSource};
use realty_risk::domains::bedroom::{assess_bedroom, BedroomChecklist};
use realty_risk::domains::climate::{assess_climate, ClimateRequest};
use realty_risk::domains::crime::{assess_crime, assess_heatmap, CrimeRequest, HeatmapRequest};
use realty_risk::domains::emf::{assess_emf, EmfRequest};
use realty_risk::domains::esoteric::{assess_esoteric, EsotericRequest};
use realty_risk::domains::feng_shui::{assess_feng_shui, FengShuiRequest};
use realty_risk::domains::vastu::{assess_vastu, VastuRequest};
use realty_risk::error::RiskError;
use realty_risk::output::{self, Report};
use realty_risk::request::load_request;

const EXIT_SUCCESS: i32 = 0;
const EXIT_FAILURE: i32 = 1;
const EXIT_VALIDATION: i32 = 2;
const EXIT_DATA_SOURCE: i32 = 3;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score EMF exposure from nearby and in-home sources
    Emf {
        /// Request file (YAML, or JSON by extension)
        request: PathBuf,
    },
    /// Score neighborhood crime and safety
    Crime { request: PathBuf },
    /// Grid of relative crime intensity around a location
    Heatmap { request: PathBuf },
    /// Score climate-change exposure under an emissions scenario
    Climate { request: PathBuf },
    /// Feng Shui flying-star and element reading
    FengShui { request: PathBuf },
    /// Vastu Shastra layout check
    Vastu { request: PathBuf },
    /// Combined Feng Shui and Vastu compatibility
    Esoteric { request: PathBuf },
    /// Quick bedroom EMF checklist
    Bedroom { request: PathBuf },
    /// Weighted overall score across several domains
    Composite { request: PathBuf },
    /// Write a config file (interactive unless --defaults)
    Init {
        /// Write the built-in defaults without prompting
        #[arg(long)]
        defaults: bool,
    },
}

#[derive(Parser, Debug)]
#[command(name = "realty-risk")]
#[command(about = "Property risk and suitability scoring", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/realty-risk/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print the assessment as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Seed for synthetic data (overrides the config file)
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Also save the assessment as JSON to this file
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

fn exit_code(err: &RiskError) -> i32 {
    match err {
        RiskError::Validation { .. } | RiskError::Parse { .. } => EXIT_VALIDATION,
        RiskError::DataSource(_) => EXIT_DATA_SOURCE,
        RiskError::Io(_) => EXIT_FAILURE,
    }
}

fn report_error(path: &Path, err: &RiskError) {
    match err {
        RiskError::Validation { violations } => {
            eprintln!("Invalid request {}:", path.display());
            for violation in violations {
                eprintln!("  - {}", violation);
            }
        }
        RiskError::Io(e) => eprintln!("Failed to read {}: {}", path.display(), e),
        other => eprintln!("{}", other),
    }
}

fn data_source(config: &Config, seed: Option<u64>) -> Box<dyn DataSource> {
    match config.data_source.mode {
        DataSourceMode::Synthetic => Box::new(SyntheticDataSource::new(
            seed.unwrap_or(config.data_source.seed),
        )),
        DataSourceMode::Live => Box::new(LiveDataSource),
    }
}

fn run(
    command: &Commands,
    config: &Config,
    source: &mut dyn DataSource,
    current_year: i32,
) -> Result<Report, RiskError> {
    let scoring = &config.scoring;
    let report = match command {
        Commands::Emf { request } => {
            let req: EmfRequest = load_request(request)?;
            Report::Emf(assess_emf(&req, &scoring.emf))
        }
        Commands::Crime { request } => {
            let req: CrimeRequest = load_request(request)?;
            Report::Crime(assess_crime(&req, &scoring.crime, source)?)
        }
        Commands::Heatmap { request } => {
            let req: HeatmapRequest = load_request(request)?;
            Report::Heatmap(assess_heatmap(&req, &scoring.crime, source)?)
        }
        Commands::Climate { request } => {
            let req: ClimateRequest = load_request(request)?;
            Report::Climate(assess_climate(&req, &scoring.climate, source)?)
        }
        Commands::FengShui { request } => {
            let req: FengShuiRequest = load_request(request)?;
            Report::FengShui(assess_feng_shui(&req, current_year, &scoring.esoteric.levels))
        }
        Commands::Vastu { request } => {
            let req: VastuRequest = load_request(request)?;
            Report::Vastu(assess_vastu(&req, &scoring.esoteric))
        }
        Commands::Esoteric { request } => {
            let req: EsotericRequest = load_request(request)?;
            Report::Esoteric(assess_esoteric(&req, &scoring.esoteric, current_year))
        }
        Commands::Bedroom { request } => {
            let req: BedroomChecklist = load_request(request)?;
            Report::Bedroom(assess_bedroom(&req))
        }
        Commands::Composite { request } => {
            let req: CompositeRequest = load_request(request)?;
            Report::Composite(assess_composite(&req, scoring, source, current_year)?)
        }
        Commands::Init { .. } => unreachable!("init is handled before config loading"),
    };
    Ok(report)
}

fn request_path(command: &Commands) -> &Path {
    match command {
        Commands::Emf { request }
        | Commands::Crime { request }
        | Commands::Heatmap { request }
        | Commands::Climate { request }
        | Commands::FengShui { request }
        | Commands::Vastu { request }
        | Commands::Esoteric { request }
        | Commands::Bedroom { request }
        | Commands::Composite { request } => request,
        Commands::Init { .. } => Path::new(""),
    }
}

fn main() {
    let cli = Cli::parse();
    realty_risk::logging::init_logger(cli.verbose);
    let start_time = Instant::now();

    if let Commands::Init { defaults } = cli.command {
        match realty_risk::config::init::run_init(cli.config, defaults) {
            Ok(Some(path)) => println!("Config written to {}", path.display()),
            Ok(None) => {}
            Err(e) => {
                eprintln!("Init error: {:#}", e);
                std::process::exit(EXIT_CONFIG);
            }
        }
        std::process::exit(EXIT_SUCCESS);
    }

    // Load and validate config at startup
    let config = match realty_risk::config::load_config(cli.config.clone()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    let mut source = data_source(&config, cli.seed);
    let current_year = Utc::now().year();

    let report = match run(&cli.command, &config, source.as_mut(), current_year) {
        Ok(r) => r,
        Err(e) => {
            report_error(request_path(&cli.command), &e);
            std::process::exit(exit_code(&e));
        }
    };

    if cli.json {
        match output::format_json(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Failed to serialize assessment: {}", e);
                std::process::exit(EXIT_FAILURE);
            }
        }
    } else {
        let text = output::format_report(
            &report,
            output::should_use_colors(),
            output::get_terminal_width(),
        );
        println!("{}", text);
    }

    if let Some(path) = &cli.output {
        if let Err(e) = output::save_report(path, &report, Utc::now()) {
            eprintln!("Failed to save report: {:#}", e);
            std::process::exit(EXIT_FAILURE);
        }
    }

    debug!(kind = report.kind(), elapsed = ?start_time.elapsed(), "done");
    std::process::exit(EXIT_SUCCESS);
}
