use clap::Parser;

use metalstore::cli::command::Cli;
use metalstore::cli::{self, output};
use metalstore::config::Config;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    output::configure(output::OutputConfig {
        json: cli.json,
        quiet: cli.quiet,
    });

    let config = match Config::load_or_default(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            output::error(format!("failed to load config: {e}"));
            std::process::exit(1);
        }
    };

    config.logging.init(cli.verbose, cli.quiet);

    if let Err(e) = cli::dispatch(cli, config).await {
        output::error(e.to_string());
        std::process::exit(1);
    }
}
