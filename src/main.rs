use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::*;
use depdocs::output::{render_consolidated, write_separate, OutputFormat};
use depdocs::{logging, Config, DocsService, FetchDocsRequest, UploadedFile};
use indicatif::{ProgressBar, ProgressStyle};
use log::warn;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level: error, warn, info, debug, trace
    #[arg(short, long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the libraries referenced by local source files
    Scan {
        /// Files to scan
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Fetch official documentation for libraries as text chunks
    Docs {
        /// Library names
        #[arg(required = true)]
        libraries: Vec<String>,

        /// SerpAPI key (defaults to SERPAPI_KEY)
        #[arg(long)]
        serpapi_key: Option<String>,

        /// Gemini key (defaults to GEMINI_KEY)
        #[arg(long)]
        gemini_key: Option<String>,

        /// Output shape
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// File for `json`/`consolidated` (stdout when omitted), directory for `separate`
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level);

    let config = Config::load(cli.config.as_deref()).context("loading configuration")?;
    let service = DocsService::new(config)?;

    match cli.command {
        Commands::Scan { paths } => scan(&service, &paths).await,
        Commands::Docs {
            libraries,
            serpapi_key,
            gemini_key,
            format,
            output,
        } => {
            let request = FetchDocsRequest {
                libraries,
                serpapi_key,
                gemini_key,
            };
            docs(&service, request, format, output.as_deref()).await
        }
    }
}

async fn scan(service: &DocsService, paths: &[PathBuf]) -> anyhow::Result<()> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        match tokio::fs::read(path).await {
            Ok(content) => files.push(UploadedFile::new(path.to_string_lossy(), content)),
            Err(e) => warn!("Skipping {}: {}", path.display(), e),
        }
    }

    let mut libraries = service.upload(&files)?.libraries;
    libraries.sort();

    if libraries.is_empty() {
        println!("{}", "No dependencies found.".yellow());
        return Ok(());
    }

    println!("{}", format!("Found {} libraries:", libraries.len()).bright_green().bold());
    for library in &libraries {
        println!("  {}", library.bright_white());
    }
    Ok(())
}

async fn docs(
    service: &DocsService,
    request: FetchDocsRequest,
    format: OutputFormat,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message(format!("Fetching documentation for {} libraries...", request.libraries.len()));

    let outcome = service.fetch_docs(request).await;
    pb.finish_and_clear();

    let text = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&outcome)?,
        OutputFormat::Consolidated => render_consolidated(&outcome),
        OutputFormat::Separate => {
            let dir = output.unwrap_or_else(|| Path::new("."));
            let written = write_separate(&outcome, dir)
                .with_context(|| format!("writing documentation files to {}", dir.display()))?;
            for path in &written {
                eprintln!("{} {}", "Saved".bright_green(), path.display().to_string().bright_white());
            }
            return Ok(());
        }
    };

    match output {
        Some(path) => {
            tokio::fs::write(path, text)
                .await
                .with_context(|| format!("writing {}", path.display()))?;
            eprintln!(
                "{} {}",
                format!("Documentation for {} libraries saved to", outcome.len()).bright_green(),
                path.display().to_string().bright_white().bold()
            );
        }
        None => println!("{}", text),
    }
    Ok(())
}
