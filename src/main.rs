use clap::{Parser, Subcommand, ValueEnum};
use konut_core::export::{read_csv, write_csv};
use konut_core::{
    create_dataset_table, create_importance_table, normalize_query, EncodingTable, PriceModel,
    RawQuery, Result,
};
use konut_scrapers::{
    FailurePolicy, ScraperConfig, ScraperFactory, ScraperType as CoreScraperType, SearchTarget,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a rental dataset from one search results page
    #[command(about = "Build a rental dataset from one search results page")]
    #[command(long_about = "Fetch the search results for a city and optional district, read every listing on the page and print the complete rows. Currently supports Emlakjet.")]
    Scrape(ScrapeCommand),

    /// Estimate the rent of a listing from an exported dataset
    #[command(about = "Estimate the rent of a listing")]
    #[command(long_about = "Encode an exported dataset, fit a random forest on 80% of it, print the feature importances and the estimated rent for the given attribute values.")]
    Query(QueryCommand),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliScraperType {
    Emlakjet,
}

impl From<CliScraperType> for CoreScraperType {
    fn from(value: CliScraperType) -> Self {
        match value {
            CliScraperType::Emlakjet => CoreScraperType::Emlakjet,
        }
    }
}

#[derive(Parser)]
struct ScrapeCommand {
    /// The scraper to use (-x, --scraper)
    #[arg(short = 'x', long, value_enum, default_value_t = CliScraperType::Emlakjet)]
    scraper: CliScraperType,

    /// City to search in, e.g. antalya (-c, --city)
    #[arg(short = 'c', long)]
    city: String,

    /// District within the city, e.g. muratpasa (-n, --district)
    #[arg(short = 'n', long)]
    district: Option<String>,

    /// Write complete rows to this CSV file (-o, --output)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// JSON scraper configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Site base URL
    #[arg(long, env = "KONUT_BASE_URL")]
    base_url: Option<String>,

    /// Detail pages fetched at once (-j, --concurrency)
    #[arg(short = 'j', long)]
    concurrency: Option<usize>,

    /// Retries for timeouts, 429 and 5xx answers
    #[arg(long)]
    max_retries: Option<u32>,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Keep going when a listing page cannot be fetched
    #[arg(long)]
    skip_failed: bool,
}

impl ScrapeCommand {
    fn scraper_config(&self) -> Result<ScraperConfig> {
        let mut config = match &self.config {
            Some(path) => ScraperConfig::from_file(path)?,
            None => ScraperConfig::default(),
        };

        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        if let Some(max_retries) = self.max_retries {
            config.max_retries = max_retries;
        }
        if let Some(timeout_secs) = self.timeout_secs {
            config.timeout_secs = timeout_secs;
        }
        if self.skip_failed {
            config.failure_policy = FailurePolicy::SkipAndContinue;
        }

        Ok(config)
    }
}

#[derive(Parser)]
struct QueryCommand {
    /// Dataset CSV written by `scrape --output` (-d, --dataset)
    #[arg(short = 'd', long)]
    dataset: PathBuf,

    /// Net area in m², e.g. 120
    #[arg(long)]
    net_area: String,

    /// Floor number, e.g. 3
    #[arg(long)]
    floor: String,

    /// Room layout, e.g. 3+1
    #[arg(long)]
    rooms: String,

    /// Heating type (Klimalı/Yok)
    #[arg(long)]
    heating: String,

    /// Bathroom count, e.g. 1
    #[arg(long)]
    bathrooms: String,

    /// Furnishing (Eşyalı/Değil)
    #[arg(long)]
    furnished: String,

    /// Inside a residential complex (Evet/Hayır)
    #[arg(long)]
    in_complex: String,

    /// Balcony (Var/Yok)
    #[arg(long)]
    balcony: String,
}

impl QueryCommand {
    fn raw_query(&self) -> RawQuery {
        RawQuery {
            net_area: self.net_area.clone(),
            floor: self.floor.clone(),
            rooms: self.rooms.clone(),
            heating: self.heating.clone(),
            bathrooms: self.bathrooms.clone(),
            furnished: self.furnished.clone(),
            in_complex: self.in_complex.clone(),
            balcony: self.balcony.clone(),
        }
    }
}

/// Run the scrape. `Ok(false)` means the pipeline already logged why it stopped.
async fn scrape(cmd: ScrapeCommand) -> Result<bool> {
    let config = cmd.scraper_config()?;
    let scraper = ScraperFactory::create_scraper(cmd.scraper.into(), config)?;
    let target = SearchTarget::from_user_input(&cmd.city, cmd.district.as_deref());

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling scrape");
            on_interrupt.cancel();
        }
    });

    let dataset = match scraper.scrape(&target, &cancel).await {
        Ok(dataset) => dataset,
        Err(_) => return Ok(false),
    };
    let rows = dataset.complete_rows();
    info!("{} of {} listings are complete", rows.len(), dataset.len());

    for failure in &dataset.failures {
        warn!("Listing {} ({}) skipped: {}", failure.index, failure.url, failure.reason);
    }

    println!("{}", create_dataset_table(&rows));

    if let Some(output) = &cmd.output {
        write_csv(&rows, output)?;
    }

    Ok(true)
}

fn query(cmd: QueryCommand) -> Result<()> {
    let rows = read_csv(&cmd.dataset)?;
    let table = EncodingTable::build(&rows);
    let encoded_rows = rows
        .iter()
        .map(|row| table.encode_row(row))
        .collect::<Result<Vec<_>>>()?;

    let features = table.encode(&normalize_query(&cmd.raw_query())?)?;
    let model = PriceModel::fit(&encoded_rows)?;

    println!("{}", create_importance_table(model.importances()));
    if let Some(mae) = model.test_mae() {
        println!(
            "Mean absolute error on {} held-out listings: {:.2} TL",
            model.test_rows(),
            mae
        );
    }
    println!("Estimated rent: {:.2} TL", model.predict(&features)?);

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Scrape(cmd) => scrape(cmd).await,
        Commands::Query(cmd) => query(cmd).map(|()| true),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
