use std::process::ExitCode;

use chrono::Utc;
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use nhexport::cli::{normalize_args, Args};
use nhexport::config;
use nhexport::core::{run, ExportError, Stage};
use nhexport::infrastructure::NiceHashClient;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let today = Utc::now().date_naive();
    let args = Args::parse_from(normalize_args(std::env::args_os()));
    init_logging(&args);

    let config = match config::load().and_then(|settings| args.into_config(settings, today)) {
        Ok(config) => config,
        Err(err) => return fail(Stage::ParsingArgs, err),
    };

    let client = match NiceHashClient::new(config.api_url.clone(), config.timeout) {
        Ok(client) => client,
        Err(err) => return fail(Stage::Fetching, err),
    };

    match run(&config, &client).await {
        Ok(summary) => {
            match &summary.path {
                Some(path) => info!(rows = summary.rows, "Wrote to {}", path.display()),
                None => info!(rows = summary.rows, "Wrote to stdout"),
            }
            ExitCode::SUCCESS
        }
        Err(err) => report(err),
    }
}

fn fail(stage: Stage, err: ExportError) -> ExitCode {
    debug!(?stage, next = ?Stage::Failed, %err, "export failed");
    report(err)
}

fn report(err: ExportError) -> ExitCode {
    eprintln!("nhexport: {err}");
    ExitCode::from(err.exit_code())
}

/// Log to stderr so CSV on stdout stays clean
fn init_logging(args: &Args) {
    let default_level = if args.quiet {
        "warn"
    } else if args.verbose {
        "debug"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_level(true)
        .with_target(false)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("nhexport: logging disabled: {err}");
    }
}
