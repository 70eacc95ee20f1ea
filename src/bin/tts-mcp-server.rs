use clap::Parser;

use tts_mcp::server::{start_server, ServerArgs};

// Stdout carries the protocol; everything human-readable goes to stderr.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();
    let args = ServerArgs::parse();

    let config = args.into_config()?;
    start_server(config).await?;

    Ok(())
}
