//! imagesearch CLI - Command-line interface for the imagesearch library
//!
//! Searches Bing Image Search and Google Custom Search with one keyword and
//! prints the merged results as LTSV, JSON or a table.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use imagesearch::{
    aggregate_search, config::DEFAULT_CONFIG_PATH, initialize,
    utils::query::{extract_prefixed, parse_query_pairs},
    ExtraParams, ImageRecord, ProviderId, ProviderParams, SearchError,
};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "imagesearch")]
#[command(about = "Multi-provider image search CLI")]
#[command(version)]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(long, global = true, env = "IMAGESEARCH_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search every configured provider
    Search {
        /// Search keyword
        keyword: String,

        /// Number of results requested from each provider
        #[arg(short, long, default_value = "10")]
        count: u64,

        /// Extra Bing query parameters, e.g. "mkt=ja-jp, safeSearch=Strict"
        #[arg(short, long, default_value = "")]
        bing: String,

        /// Extra Google query parameters, e.g. "safe=active, imgSize=large"
        #[arg(short, long, default_value = "")]
        google: String,

        /// Extra Bing request headers, e.g. "Accept-Language=ja"
        #[arg(long, default_value = "")]
        bing_header: String,

        /// Extra Google request headers
        #[arg(long, default_value = "")]
        google_header: String,

        /// Provider-prefixed query parameter, e.g. bing_mkt=en-US (repeatable)
        #[arg(short, long = "param")]
        params: Vec<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "ltsv")]
        format: OutputFormat,

        /// Write results to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List configured providers and their settings
    Providers,
}

#[derive(ValueEnum, Clone, Debug)]
enum OutputFormat {
    Ltsv,
    Json,
    Table,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err:#}", "Error:".red().bold());
            if let Some(hint) = err
                .downcast_ref::<SearchError>()
                .and_then(SearchError::troubleshooting)
            {
                eprintln!("{} {hint}", "Troubleshooting:".yellow().bold());
            }
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Search {
            keyword,
            count,
            bing,
            google,
            bing_header,
            google_header,
            params,
            format,
            output,
        } => {
            let extras = build_extras(&bing, &google, &bing_header, &google_header, &params)?;
            handle_search(&cli.config, &keyword, count, &extras, format, output).await
        }
        Commands::Providers => handle_list_providers(&cli.config),
    }
}

fn build_extras(
    bing: &str,
    google: &str,
    bing_header: &str,
    google_header: &str,
    params: &[String],
) -> anyhow::Result<ProviderParams> {
    let prefixed = parse_query_pairs(&params.join(","))?;

    let mut bing_query = parse_query_pairs(bing)?;
    bing_query.extend(extract_prefixed(&prefixed, "bing_"));
    let mut google_query = parse_query_pairs(google)?;
    google_query.extend(extract_prefixed(&prefixed, "google_"));

    let mut extras = ProviderParams::new();
    extras.insert(
        ProviderId::Bing,
        ExtraParams {
            query: bing_query,
            headers: parse_query_pairs(bing_header)?,
        },
    );
    extras.insert(
        ProviderId::Google,
        ExtraParams {
            query: google_query,
            headers: parse_query_pairs(google_header)?,
        },
    );
    Ok(extras)
}

async fn handle_search(
    config_path: &Path,
    keyword: &str,
    count: u64,
    extras: &ProviderParams,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let aggregator = initialize(config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;

    let records = aggregate_search(&aggregator, keyword, count, extras).await?;

    match output {
        Some(path) => {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            write_results(&mut writer, &records, &format)?;
            writer.flush()?;
        }
        None => {
            let stdout = io::stdout();
            write_results(&mut stdout.lock(), &records, &format)?;
        }
    }

    Ok(())
}

fn handle_list_providers(config_path: &Path) -> anyhow::Result<()> {
    let aggregator = initialize(config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;

    println!("{}", "Configured Providers:".bold().blue());
    println!();

    for provider in aggregator.providers() {
        println!("{} {}", "✅".green(), provider.name().bold());
        for (key, value) in provider.describe() {
            println!("   {}: {}", key, value.italic());
        }
        println!();
    }

    Ok(())
}

fn write_results(
    out: &mut dyn Write,
    records: &[ImageRecord],
    format: &OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Ltsv => {
            for record in records {
                writeln!(out, "{}", record.to_ltsv())?;
            }
        }
        OutputFormat::Json => {
            writeln!(out, "{}", serde_json::to_string_pretty(records)?)?;
        }
        OutputFormat::Table => {
            writeln!(out, "{}", "Image Search Results".bold().blue())?;
            writeln!(out, "{}", "─".repeat(80).dimmed())?;

            for (i, record) in records.iter().enumerate() {
                writeln!(
                    out,
                    "{}. [{}] {}",
                    (i + 1).to_string().bold(),
                    record.provider_id().to_string().cyan(),
                    record.url().blue().underline()
                )?;
                writeln!(
                    out,
                    "   {}x{} px, {} bytes",
                    record.width(),
                    record.height(),
                    record.byte_size()
                )?;
            }

            writeln!(out)?;
            writeln!(out, "{} {}", "Total results:".bold(), records.len().to_string().bold())?;
        }
    }

    Ok(())
}
