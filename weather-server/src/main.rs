//! Binary crate for the `cep-weather` HTTP server.
//!
//! This crate focuses on:
//! - Parsing CLI arguments and resolving configuration
//! - Logging setup
//! - Serving `GET /weather` and mapping lookup errors to HTTP responses

use clap::Parser;

mod app;
mod cli;
mod logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();
    logging::init(cmd.log_format)?;
    cmd.run().await
}
