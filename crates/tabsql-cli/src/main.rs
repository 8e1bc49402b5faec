use clap::Parser;
use std::path::PathBuf;
use tabsql_core::storage::config::Config;

mod cli;

use cli::dispatcher::{Dispatcher, SessionOptions, report_error};
use cli::main_types::Cli;

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "warn,tabsql_core=debug,tabsql=debug"
    } else {
        "warn"
    };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Load Config
    let config_path = cli
        .config_dir
        .as_ref()
        .map(|dir| Config::file_in(&PathBuf::from(dir)));

    let config = match Config::load(config_path.clone()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error loading config: {}", err);
            std::process::exit(1);
        }
    };

    if cli.verbose {
        eprintln!("Verbose mode is enabled");

        if let Some(config_dir) = &cli.config_dir {
            eprintln!("Using config directory: {}", config_dir);
        }
    }

    let options = SessionOptions {
        database: cli.database,
        load: cli.load,
        page_size: cli.page_size,
    };
    let dispatcher = Dispatcher::new(config, config_path, cli.verbose, options);

    if let Err(e) = dispatcher.dispatch(cli.command).await {
        report_error(&e);
        std::process::exit(1);
    }

    Ok(())
}
