mod cli;
mod terminal;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};

use auditlens_compute::{DocumentRenderer, ReviewPipeline, TextDocumentRenderer};
use auditlens_core::config::load_dotenv;
use auditlens_core::ReviewConfig;
use auditlens_ingest::CsvImporter;

use crate::cli::CliArgs;
use crate::terminal::Terminal;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    load_dotenv();
    let args = CliArgs::parse();
    let terminal = Terminal::new();

    let mut config = ReviewConfig::from_env();
    args.apply(&mut config);
    config.log_summary();

    let Some(delimiter) = args.delimiter_byte() else {
        bail!("delimiter must be a single ASCII character, got {:?}", args.delimiter);
    };

    let table = CsvImporter::new()
        .with_delimiter(delimiter)
        .load_path(&args.path)
        .with_context(|| format!("failed to load {}", args.path.display()))?;

    let pipeline = ReviewPipeline::new(config).context("invalid review configuration")?;
    let report = pipeline.run(&table);

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("failed to serialize report")?
        );
    } else {
        terminal.print_banner(&args.path.display().to_string())?;
        terminal.print_report(&table, &report, args.preview_rows)?;
    }

    // The report above stands even if the document cannot be produced.
    if let Some(path) = &args.export {
        match TextDocumentRenderer::new().write_to(path, &report.summary, &report.top_anomalies) {
            Ok(()) => {
                info!("Exported summary document to {}", path.display());
                if !args.json {
                    terminal.print_success(&format!("Report exported to {}", path.display()))?;
                }
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "summary export failed");
                terminal.print_error(&format!("failed to export report: {}", e))?;
            }
        }
    }

    Ok(())
}
