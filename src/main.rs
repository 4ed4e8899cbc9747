mod cli;
mod client;
mod commands;
mod config;
mod error;
mod lookup;
mod output;
mod repository;
mod search;
mod store;
mod theme;
mod types;
mod validate;

use std::io;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use client::HttpUserSource;
use config::Config;
use error::Result;
use repository::UserRepository;
use std::error::Error;
use store::FileStore;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");

        // Show error chain if verbose flag was passed
        if std::env::args().any(|arg| arg == "--verbose" || arg == "-v") {
            let mut source = e.source();
            while let Some(cause) = source {
                eprintln!("Caused by: {cause}");
                source = std::error::Error::source(cause);
            }
        }

        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(false)
        .with_target(false)
        .init();
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    // Set global output settings
    output::set_format(cli.output_format());
    output::set_quiet(cli.quiet);

    match cli.command {
        // Commands that don't require config/storage
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "userdir", &mut io::stdout());
        }
        Commands::Init => {
            commands::init::run().await?;
        }
        // Commands that require config and storage
        command => {
            let config = Config::load()?;
            let store = FileStore::in_dir(&config.data_dir()?);
            output::set_theme(theme::load_theme(&store));

            let api_url = config.api_url();
            let source = || HttpUserSource::new(&api_url);

            match command {
                Commands::Theme { action } => {
                    commands::theme::run(&store, action)?;
                }
                Commands::List(args) => {
                    let repository = UserRepository::initialize(source()?, store).await;
                    commands::users::list(&repository, args).await?;
                }
                Commands::Show { id } => {
                    // Local users are restored up front; remote users are
                    // fetched one at a time on demand.
                    let repository = UserRepository::new(source()?, store);
                    commands::users::show(&repository, &id).await?;
                }
                Commands::Add(args) => {
                    let repository = UserRepository::initialize(source()?, store).await;
                    commands::users::add(&repository, args).await?;
                }
                Commands::Search => {
                    let repository = UserRepository::new(source()?, store);
                    commands::users::search(&repository, config.search_debounce()).await?;
                }
                Commands::Completions { .. } | Commands::Init => {
                    // Already handled above
                }
            }
        }
    }

    Ok(())
}
