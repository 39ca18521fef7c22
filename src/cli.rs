use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::catalog::{CatalogDataset, CkanClient};
use crate::config::{CatalogSite, Configuration, DEFAULT_CONFIG_PATH};
use crate::data::builder::{generate_dataset, BuildContext};
use crate::data::dataset::BuildOutcome;
use crate::data::grouping::{get_data, CountryBoundarySet};
use crate::fetch::{Fetch, HttpDownloader, LocalFile};
use crate::location::{CountryTable, Locations};
use crate::logging;
use crate::parallel::WorkerPool;
use crate::progress::{default_state_dir, Progress, StartMarker};
use crate::report::write_plan_csv;
use crate::runner;

#[derive(Debug, Parser)]
#[command(name = "geoboundaries", about = "Publish geoBoundaries admin boundaries to HDX")]
pub struct Cli {
    /// Project configuration YAML.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,
    /// Debug-level logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build every country and create or update it on HDX.
    Run(RunArgs),
    /// Build every country without publishing and summarise the outcome.
    Plan(PlanArgs),
    /// Print the catalog payload for one country.
    Show(ShowArgs),
}

#[derive(Debug, Args)]
pub struct SourceArgs {
    /// Read the boundary listing from a saved JSON file instead of the API.
    #[arg(long)]
    pub input: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[arg(long = "hdx-key", env = "HDX_KEY", hide_env_values = true)]
    pub hdx_key: Option<String>,
    #[arg(long = "hdx-site", env = "HDX_SITE", default_value = "prod")]
    pub hdx_site: String,
    /// RESET, RESUME or the ISO3 code to start from.
    #[arg(short, long, env = "WHERETOSTART", default_value = "RESET")]
    pub start: String,
    #[arg(long = "state-dir")]
    pub state_dir: Option<PathBuf>,
    #[command(flatten)]
    pub source: SourceArgs,
}

#[derive(Debug, Args)]
pub struct PlanArgs {
    /// Write the plan as CSV; otherwise print it as JSON.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Worker threads (0 = all cores).
    #[arg(short, long, default_value_t = 0)]
    pub workers: usize,
    #[command(flatten)]
    pub source: SourceArgs,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    pub iso3: String,
    #[command(flatten)]
    pub source: SourceArgs,
}

pub fn run_with_args(args: &[String]) -> i32 {
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() { 2 } else { 0 };
            let _ = err.print();
            return code;
        }
    };
    logging::init(cli.verbose);

    let config = match Configuration::load(&cli.config) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("config error: {err}");
            return 1;
        }
    };

    match &cli.command {
        Command::Run(args) => handle_run(&config, args),
        Command::Plan(args) => handle_plan(&config, args),
        Command::Show(args) => handle_show(&config, args),
    }
}

fn handle_run(config: &Configuration, args: &RunArgs) -> i32 {
    let Some(hdx_key) = args.hdx_key.as_deref().filter(|key| !key.trim().is_empty()) else {
        eprintln!("usage: geoboundaries run --hdx-key <KEY> (or set HDX_KEY)");
        return 2;
    };
    let site: CatalogSite = match args.hdx_site.parse() {
        Ok(site) => site,
        Err(err) => {
            eprintln!("{err}");
            return 2;
        }
    };
    let start: StartMarker = match args.start.parse() {
        Ok(start) => start,
        Err(err) => {
            eprintln!("{err}");
            return 2;
        }
    };

    let fetcher = match fetcher_for(config, &args.source) {
        Ok(fetcher) => fetcher,
        Err(code) => return code,
    };
    let publisher = match CkanClient::new(site.base_url(), hdx_key, &config.user_agent) {
        Ok(client) => client,
        Err(err) => {
            eprintln!("catalog client error: {err}");
            return 1;
        }
    };
    let state_dir = args.state_dir.clone().unwrap_or_else(default_state_dir);
    let progress = match Progress::open(&state_dir, &start) {
        Ok(progress) => progress,
        Err(err) => {
            eprintln!("progress error: {err}");
            return 1;
        }
    };

    tracing::info!(site = %site, batch = %progress.batch(), "starting publish run");
    let locations = Locations::default();
    let ctx = BuildContext::from_config(config, &CountryTable, &locations);
    match runner::run(config, &ctx, fetcher.as_ref(), &publisher, progress) {
        Ok(summary) if summary.is_success() => {
            println!(
                "run complete: published={}, skipped={}",
                summary.published.len(),
                summary.skipped_redundant.len() + summary.skipped_invalid_location.len()
            );
            0
        }
        Ok(summary) => {
            eprintln!("run finished with {} failed country(ies)", summary.failed.len());
            for failure in &summary.failed {
                eprintln!("- {}: {}", failure.iso3, failure.message);
            }
            1
        }
        Err(err) => {
            eprintln!("run failed: {err}");
            1
        }
    }
}

fn handle_plan(config: &Configuration, args: &PlanArgs) -> i32 {
    let boundaries = match load_boundaries(config, &args.source) {
        Ok(boundaries) => boundaries,
        Err(code) => return code,
    };
    let locations = Locations::default();
    let ctx = BuildContext::from_config(config, &CountryTable, &locations);
    let rows = runner::plan(&ctx, &boundaries, &WorkerPool::with_workers(args.workers));

    match &args.output {
        Some(path) => match write_plan_csv(path, &rows) {
            Ok(()) => {
                println!("plan written: countries={}, path='{}'", rows.len(), path.display());
                0
            }
            Err(err) => {
                eprintln!("{err}");
                1
            }
        },
        None => print_json(&rows),
    }
}

fn handle_show(config: &Configuration, args: &ShowArgs) -> i32 {
    let boundaries = match load_boundaries(config, &args.source) {
        Ok(boundaries) => boundaries,
        Err(code) => return code,
    };
    let iso3 = args.iso3.trim().to_uppercase();
    let Some(records) = boundaries.get(&iso3) else {
        eprintln!("no eligible boundaries for {iso3}");
        return 1;
    };

    let locations = Locations::default();
    let ctx = BuildContext::from_config(config, &CountryTable, &locations);
    match generate_dataset(&ctx, &iso3, records) {
        Ok(BuildOutcome::Published(published)) => {
            let payload =
                CatalogDataset::from_published(&published, &config.dataset, &config.tag_vocabulary);
            print_json(&payload)
        }
        Ok(outcome) => {
            println!("{iso3}: {}", outcome.label());
            0
        }
        Err(err) => {
            eprintln!("build failed: {err}");
            1
        }
    }
}

fn fetcher_for(config: &Configuration, source: &SourceArgs) -> Result<Box<dyn Fetch>, i32> {
    match &source.input {
        Some(path) => Ok(Box::new(LocalFile::new(path))),
        None => HttpDownloader::new(&config.user_agent)
            .map(|downloader| Box::new(downloader) as Box<dyn Fetch>)
            .map_err(|err| {
                eprintln!("downloader error: {err}");
                1
            }),
    }
}

fn load_boundaries(config: &Configuration, source: &SourceArgs) -> Result<CountryBoundarySet, i32> {
    let fetcher = fetcher_for(config, source)?;
    get_data(fetcher.as_ref(), &config.url, &config.excluded_income_groups).map_err(|err| {
        eprintln!("fetch failed: {err}");
        1
    })
}

fn print_json<T: serde::Serialize>(value: &T) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize output: {err}");
            1
        }
    }
}

