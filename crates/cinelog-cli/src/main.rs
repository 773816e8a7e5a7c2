use std::time::Duration;

use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cinelog_client::{PageFetcher, PosterEnricher};
use cinelog_core::catalog::{CatalogConfig, CatalogService, CrawlSource};
use cinelog_core::throttle::PacedFetcher;
use cinelog_core::traits::SystemClock;

#[derive(Parser)]
#[command(name = "cinelog", version, about = "One-shot movie-diary crawls")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceOpts {
    /// Source-site username whose diary to crawl
    #[arg(short, long, env = "CINELOG_USER")]
    user: String,

    #[arg(long, env = "CINELOG_BASE_URL", default_value = "https://letterboxd.com")]
    base_url: String,

    /// Safety ceiling on pages fetched per listing
    #[arg(long, env = "CINELOG_MAX_PAGES")]
    max_pages: Option<usize>,

    /// Whole-crawl timeout in seconds
    #[arg(long, env = "CINELOG_CRAWL_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Page fetch transport: "static" or "browser"
    #[arg(long, env = "CINELOG_FETCH_MODE", default_value = "static")]
    mode: String,

    /// Minimum interval between page fetches, in milliseconds
    #[arg(long, env = "CINELOG_FETCH_DELAY_MS", default_value_t = 250)]
    delay_ms: u64,

    /// TMDB key enabling poster enrichment
    #[arg(long, env = "TMDB_API_KEY")]
    tmdb_key: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl the diary and print the records as JSON
    Crawl {
        #[command(flatten)]
        opts: SourceOpts,

        /// Logical source: films, diary, feed, or merged
        #[arg(short, long, default_value = "merged")]
        source: String,

        /// Pretty-print the JSON output
        #[arg(long, default_value_t = false)]
        pretty: bool,
    },

    /// Look a single record up by its id
    Item {
        #[command(flatten)]
        opts: SourceOpts,

        /// Record id, e.g. "the-matrix"
        #[arg(short, long)]
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("cinelog=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Crawl {
            opts,
            source,
            pretty,
        } => {
            let service = build_service(&opts).await?;
            let records = service.build_records(parse_source(&source)?).await?;

            let json = if pretty {
                serde_json::to_string_pretty(&records)?
            } else {
                serde_json::to_string(&records)?
            };
            println!("{json}");
        }

        Commands::Item { opts, id } => {
            let service = build_service(&opts).await?;
            match service.get_item(&id).await {
                Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
                None => bail!("no record with id '{id}'"),
            }
        }
    }

    Ok(())
}

fn parse_source(source: &str) -> Result<CrawlSource> {
    match source {
        "films" => Ok(CrawlSource::Films),
        "diary" => Ok(CrawlSource::Diary),
        "feed" => Ok(CrawlSource::Feed),
        "merged" => Ok(CrawlSource::Merged),
        other => bail!("unknown source '{other}' (expected films, diary, feed, or merged)"),
    }
}

async fn build_service(
    opts: &SourceOpts,
) -> Result<CatalogService<PacedFetcher<PageFetcher>, PosterEnricher, SystemClock>> {
    let fetcher = PageFetcher::from_mode(&opts.mode, Duration::from_secs(30), None).await?;
    let fetcher = PacedFetcher::new(fetcher, Duration::from_millis(opts.delay_ms));
    let enricher = PosterEnricher::from_key(opts.tmdb_key.as_deref())?;

    let config = CatalogConfig::new(&opts.user)
        .with_base_url(&opts.base_url)
        .with_max_pages(opts.max_pages)
        .with_crawl_timeout(opts.timeout_secs.map(Duration::from_secs));

    Ok(CatalogService::new(config, fetcher, enricher, SystemClock))
}
