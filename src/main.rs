use carteira::args::{Args, Command};
use carteira::{commands, Config, Mode, Result};
use clap::Parser;
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
            error!("Exiting with error: {e}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().carteira_home().path();

    // This allows for running the program without hitting the hosted
    // backend. When CARTEIRA_IN_TEST_MODE is set and non-zero in length,
    // then the mode will be Mode::Test, otherwise it will be Mode::Remote.
    let mode = Mode::from_env();

    // Route to appropriate command handler
    let _: () = match args.command() {
        Command::Init(init_args) => {
            commands::init(home, init_args.backend_url(), init_args.api_key())
                .await?
                .print()
        }

        Command::List(list_args) => {
            let config = Config::load(home).await?;
            commands::list(
                config,
                mode,
                list_args.sheet_type(),
                list_args.search_params(),
            )
            .await?
            .print()
        }

        Command::Analytics(analytics_args) => {
            let config = Config::load(home).await?;
            commands::analytics(config, mode, analytics_args.params())
                .await?
                .print()
        }

        Command::Rename(rename_args) => {
            let config = Config::load(home).await?;
            commands::rename(config, mode, rename_args.id(), rename_args.name())
                .await?
                .print()
        }

        Command::Duplicate(duplicate_args) => {
            let config = Config::load(home).await?;
            commands::duplicate(config, mode, duplicate_args.id())
                .await?
                .print()
        }

        Command::Delete(delete_args) => {
            let config = Config::load(home).await?;
            commands::delete(config, mode, delete_args.id(), delete_args.yes())
                .await?
                .print()
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
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), level))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
