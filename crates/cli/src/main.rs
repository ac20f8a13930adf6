use anyhow::{Context, Result};
use clap::Parser;
use config::Config;
use exporter::TraceExporter;
use otlp::TracesDataExt;
use std::path::PathBuf;
use tracing::{error, info};

/// Sends OTLP trace files to Uptrace
#[derive(Parser, Debug)]
#[command(name = "uptrace-export")]
#[command(about = "Export OTLP protobuf trace files to Uptrace", long_about = None)]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Uptrace DSN, overrides the configuration
    #[arg(long)]
    dsn: Option<String>,

    /// Maximum number of spans per batch, overrides the configuration
    #[arg(long, allow_negative_numbers = true)]
    max_batch_size: Option<i64>,

    /// Files containing protobuf-encoded OTLP TracesData
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Set RUST_LOG environment variable to control log level
    // Example: RUST_LOG=info or RUST_LOG=exporter=debug
    // hyper_util is always set to ERROR level to reduce noise
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
                .add_directive("hyper_util=error".parse()?),
        )
        .init();

    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(dsn) = args.dsn {
        config.exporter.dsn = dsn;
    }
    if let Some(max_batch_size) = args.max_batch_size {
        config.exporter.max_batch_size = max_batch_size;
    }

    let exporter =
        TraceExporter::new(&config.exporter).context("Failed to create trace exporter")?;

    let mut total_spans = 0;
    let mut failed_files = 0;

    for path in &args.files {
        let traces = match otlp::read_traces_file(path) {
            Ok(traces) => traces,
            Err(e) => {
                error!("Skipping {}: {}", path.display(), e);
                failed_files += 1;
                continue;
            }
        };

        let spans = traces.span_count();
        exporter.push(&traces).await?;
        total_spans += spans;

        info!(file = %path.display(), spans, "Exported trace file");
    }

    exporter.shutdown().await?;

    info!(
        files = args.files.len(),
        failed_files,
        spans = total_spans,
        "Export finished"
    );

    if failed_files > 0 {
        anyhow::bail!("{} of {} files could not be read", failed_files, args.files.len());
    }

    Ok(())
}
