//! Voice AI harness CLI entry point.

use clap::Parser;

use voiceai_harness::cli::{self, commands, handle_error, Cli, Commands};
use voiceai_harness::infrastructure::logging::LoggerImpl;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match cli::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => handle_error(err, cli.json),
    };

    // Held for the whole run so buffered file output is flushed on exit
    let _logger = match LoggerImpl::init(&config.log) {
        Ok(logger) => logger,
        Err(err) => handle_error(err, cli.json),
    };

    let result = match cli.command {
        Commands::Run(args) => commands::run::execute(args, &config, cli.json).await,
        Commands::Config(args) => commands::config::execute(&args, &config, cli.json),
        Commands::Classify(args) => commands::classify::execute(&args, &config, cli.json),
        Commands::Validate(args) => commands::validate::execute(args, &config, cli.json).await,
        Commands::Evaluate(args) => commands::evaluate::execute(args, cli.json).await,
    };

    if let Err(err) = result {
        handle_error(err, cli.json);
    }
}
