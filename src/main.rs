use clap::Parser;
use localsites_earnings::args::{Args, Command};
use localsites_earnings::{commands, Config, Mode, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().earnings_home().path();

    // This allows for running the program without a backend server. When EARNINGS_IN_TEST_MODE
    // is set and non-zero in length, then the mode will be Mode::Test, otherwise Mode::Http.
    let mode = Mode::from_env();

    let _: () = match args.command() {
        Command::Init(init_args) => commands::init(home, init_args.api_url()).await?.print(),

        Command::Fetch(fetch_args) => {
            let config = Config::load(home).await?;
            let range = fetch_args.range().range()?;
            commands::fetch(&config, mode, range).await?.print()
        }

        Command::Report(report_args) => {
            let config = Config::load(home).await?;
            commands::report(&config, report_args).await?.print()
        }

        Command::Transactions(list_args) => {
            let config = Config::load(home).await?;
            commands::transactions(&config, list_args).await?.print()
        }

        Command::Campaigns(list_args) => {
            let config = Config::load(home).await?;
            commands::campaigns(&config, list_args).await?.print()
        }

        Command::Niches(list_args) => {
            let config = Config::load(home).await?;
            commands::niches(&config, list_args).await?.print()
        }

        Command::Watch(watch_args) => {
            let config = Config::load(home).await?;
            commands::watch(&config, mode, watch_args).await?.print()
        }
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for the library and binary only.
            EnvFilter::new(format!(
                "localsites_earnings={level},{}={level}",
                env!("CARGO_BIN_NAME"),
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
