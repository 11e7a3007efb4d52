//! credex CLI - extract account information from documents.

use clap::Parser;
use credex_cli::commands::{self, Session};
use credex_cli::{Cli, Command, Config, Formatter};
use credex_definitions::DefinitionLoader;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // Logs go to stderr so stdout stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> credex_cli::Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;

    if let Some(lang) = cli.lang {
        config.extractor.language = lang.into();
    }
    if let Command::Extract(args) = &cli.command {
        if let Some(contract) = args.contract {
            config.extractor.output_contract = contract.into();
        }
    }

    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    let definitions = config.definitions_dir(cli.definitions.as_deref());
    debug!(definitions = %definitions.display(), "Using definitions");
    let loader = Arc::new(DefinitionLoader::new(definitions));

    let session = Session::new(config, loader, formatter);

    match cli.command {
        Command::Classify(args) => commands::execute_classify(args, &session).await?,
        Command::Extract(args) => commands::execute_extract(args, &session).await?,
        Command::Bench(args) => commands::execute_bench(args, &session).await?,
        Command::Definitions(args) => commands::execute_definitions(args, &session)?,
    }

    Ok(())
}
