mod pipeline;

use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use irve_core::AppConfig;
use irve_rest::StationsClient;
use irve_source::SourceClient;
use tracing_subscriber::EnvFilter;

use crate::pipeline::{completion_line, import_csv, import_records, PipelineOptions};

/// Exit status for configuration and startup failures.
const EXIT_CONFIG: u8 = 2;

#[derive(Debug, Parser)]
#[command(name = "irve-sync")]
#[command(about = "Import the French IRVE charging-station dataset into Supabase")]
struct Cli {
    /// Where to read stations from.
    #[arg(long, value_enum, default_value_t = SourceKind::Csv)]
    source: SourceKind,

    /// Map and count stations without uploading anything.
    #[arg(long)]
    dry_run: bool,

    /// Stop after this many mapped stations.
    #[arg(long)]
    limit: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SourceKind {
    /// Consolidated CSV snapshot (`IRVE_CSV_URL`).
    Csv,
    /// Paged opendatasoft records API (`IRVE_RECORDS_API_URL`).
    RecordsApi,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match irve_core::load_app_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e}");
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    if let Err(e) = init_tracing(&config) {
        eprintln!("{e:#}");
        return ExitCode::from(EXIT_CONFIG);
    }

    let (source, uploader) = match build_clients(&config) {
        Ok(clients) => clients,
        Err(e) => {
            eprintln!("{e:#}");
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    let options = PipelineOptions::from_config(&config, cli.limit);
    let uploader = (!cli.dry_run).then_some(&uploader);

    tracing::info!(
        source = ?cli.source,
        dry_run = cli.dry_run,
        limit = ?cli.limit,
        batch_size = options.batch_size,
        "starting import"
    );

    let mut stdout = std::io::stdout();
    let result = match cli.source {
        SourceKind::Csv => {
            import_csv(&source, &config.csv_url, uploader, &options, &mut stdout).await
        }
        SourceKind::RecordsApi => {
            let url = &config.records_api_url;
            import_records(&source, url, uploader, &options, &mut stdout).await
        }
    };

    match result {
        Ok(summary) => {
            tracing::info!(
                rows_read = summary.rows_read,
                rows_skipped = summary.rows_skipped,
                submitted = summary.submitted,
                dropped = summary.dropped,
                requests = summary.requests,
                "import finished"
            );
            println!("{}", completion_line(summary.submitted));
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("import failed: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so stdout carries only progress lines.
fn init_tracing(config: &AppConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .with_context(|| format!("invalid log level {:?}", config.log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn build_clients(config: &AppConfig) -> anyhow::Result<(SourceClient, StationsClient)> {
    let source = SourceClient::new(&config.user_agent, config.request_timeout_secs)
        .context("failed to build source HTTP client")?;
    let uploader = StationsClient::new(
        &config.supabase_url,
        &config.service_role_key,
        config.request_timeout_secs,
        &config.user_agent,
    )
    .context("failed to build Supabase client")?;
    Ok((source, uploader))
}
