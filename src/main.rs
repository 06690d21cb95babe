//! Tally CLI entry point.

use clap::Parser;

use tally::cli::{self, commands, Cli, Commands};
use tally::infrastructure::logging::{LogConfig, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli.command, cli.config.as_deref(), cli.json).await {
        cli::handle_error(err, cli.json);
    }
}

async fn run(command: Commands, config_path: Option<&std::path::Path>, json: bool) -> anyhow::Result<()> {
    let config = cli::load_config(config_path)?;
    let _logger = LoggerImpl::init(&LogConfig::from(&config.logging))?;

    match command {
        Commands::Init(args) => commands::init::execute(args, json).await,
        Commands::Import(args) => commands::import::execute(args, &config, json).await,
        Commands::Metadata(args) => commands::metadata::execute(args, json),
        Commands::Report(args) => commands::report::execute(args, &config, json).await,
        Commands::Serve(args) => commands::serve::execute(args, &config).await,
    }
}
