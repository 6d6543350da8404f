mod platform;

use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = platform::cli::Cli::parse();
    platform::logging::initialize(cli.log_destination(), cli.log_level);
    platform::run_app(cli).await
}
