use clap::Parser;

use tts_mcp::cli::{self, CliArgs};
use tts_mcp::initialize_client;
use tts_mcp::params::validate_options;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();
    let args = CliArgs::parse();

    let options = args.into_options();
    validate_options(&options)?;
    let client = initialize_client(options.api_key.as_deref(), options.base_url.as_deref())?;
    cli::run(options, &client).await?;

    Ok(())
}
