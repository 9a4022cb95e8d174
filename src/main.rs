//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `imprint_reader` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file, for `GEMINI_API_KEY`)
//! - Logger initialization
//! - Reading URL lists and printing the batch result as JSON
//! - Optionally serving the HTTP endpoint instead
//!
//! All core functionality is implemented in the library crate.

use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;

use imprint_reader::config::{
    BATCH_PROCESSING_TIMEOUT, DEFAULT_MAX_CONCURRENCY, DEFAULT_MAX_HUB_HOPS, DEFAULT_MODEL,
    FETCH_TIMEOUT_SECS, MAX_BATCH_SIZE, URL_PROCESSING_TIMEOUT,
};
use imprint_reader::initialization::init_logger_with;
use imprint_reader::storage::CompositeSink;
use imprint_reader::{
    BatchRequest, BatchResult, Config, ImprintExtractor, ImprintResult, LogFormat, LogLevel,
};

/// Extract legal imprint (Impressum) data from company websites.
#[derive(Parser, Debug)]
#[command(name = "imprint_reader", version, about)]
struct Cli {
    /// File with one URL per line (`#` comments allowed), or `-` for stdin
    #[arg(value_name = "FILE", required_unless_present_any = ["urls", "serve"])]
    file: Option<PathBuf>,

    /// URL to process (repeatable)
    #[arg(long = "url", value_name = "URL")]
    urls: Vec<String>,

    /// Maximum URL pipelines running concurrently
    #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENCY)]
    max_concurrency: usize,

    /// Per-URL processing timeout in seconds
    #[arg(long, default_value_t = URL_PROCESSING_TIMEOUT.as_secs())]
    url_timeout_secs: u64,

    /// Whole-batch processing timeout in seconds
    #[arg(long, default_value_t = BATCH_PROCESSING_TIMEOUT.as_secs())]
    batch_timeout_secs: u64,

    /// Timeout of a single HTTP fetch in seconds
    #[arg(long, default_value_t = FETCH_TIMEOUT_SECS)]
    fetch_timeout_secs: u64,

    /// Levels of legal hub pages searched for a nested imprint link
    #[arg(long, default_value_t = DEFAULT_MAX_HUB_HOPS)]
    max_hub_hops: usize,

    /// Gemini model name
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,

    /// Directory for the CSV table and JSON snapshots
    #[arg(long, value_name = "DIR", default_value = "results")]
    output_dir: PathBuf,

    /// Do not write results to the output directory
    #[arg(long)]
    no_save: bool,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    log_format: LogFormat,

    /// Serve `POST /api/extract-imprints` on this port instead of running once
    #[arg(long, value_name = "PORT")]
    serve: Option<u16>,
}

impl Cli {
    fn to_config(&self) -> Config {
        Config {
            max_concurrency: self.max_concurrency,
            url_timeout: Duration::from_secs(self.url_timeout_secs),
            batch_timeout: Duration::from_secs(self.batch_timeout_secs),
            fetch_timeout_seconds: self.fetch_timeout_secs,
            max_hub_hops: self.max_hub_hops,
            model: self.model.clone(),
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file (if it exists)
    // Try the current directory first, then the executable's directory
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let cli = Cli::parse();
    init_logger_with(cli.log_level.clone().into(), cli.log_format.clone())
        .context("Failed to initialize logger")?;

    if let Err(e) = run(cli).await {
        eprintln!("imprint_reader error: {:#}", e);
        process::exit(1);
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let mut extractor = ImprintExtractor::new(cli.to_config())?;
    if !cli.no_save {
        extractor = extractor.with_sink(Arc::new(CompositeSink::in_directory(&cli.output_dir)));
    }

    if let Some(port) = cli.serve {
        return imprint_reader::server::start_server(port, extractor).await;
    }

    let mut urls = cli.urls.clone();
    if let Some(file) = &cli.file {
        urls.extend(read_url_list(file)?);
    }
    if urls.is_empty() {
        anyhow::bail!("No URLs provided");
    }

    let batch = process_in_chunks(&extractor, urls).await?;
    println!(
        "{}",
        serde_json::to_string_pretty(&batch).context("Failed to serialize batch result")?
    );
    if !cli.no_save {
        eprintln!("Results saved in {}", cli.output_dir.display());
    }
    Ok(())
}

/// Runs lists longer than one request allows as consecutive batches.
async fn process_in_chunks(extractor: &ImprintExtractor, urls: Vec<String>) -> Result<BatchResult> {
    let start = Instant::now();
    let mut results: Vec<ImprintResult> = Vec::with_capacity(urls.len());
    for chunk in urls.chunks(MAX_BATCH_SIZE) {
        let batch = extractor
            .process_batch(BatchRequest {
                urls: chunk.to_vec(),
            })
            .await?;
        results.extend(batch.results);
    }
    Ok(BatchResult::from_results(results, start.elapsed().as_secs_f64()))
}

/// Reads a URL list from a file, or stdin for `-`.
fn read_url_list(path: &Path) -> Result<Vec<String>> {
    let reader: Box<dyn BufRead> = if path.as_os_str() == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open input file: {}", path.display()))?;
        Box::new(BufReader::new(file))
    };
    parse_url_lines(reader)
}

/// One URL per line; blank lines, `#` comments, and a `URL` header are skipped.
fn parse_url_lines(reader: impl BufRead) -> Result<Vec<String>> {
    let mut urls = Vec::new();
    for line in reader.lines() {
        let line = line.context("Failed to read input")?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if urls.is_empty() && trimmed.eq_ignore_ascii_case("url") {
            continue;
        }
        urls.push(trimmed.to_string());
    }
    Ok(urls)
}
