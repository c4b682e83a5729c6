//! Entry-point for the `logsift` binary.
use clap::Parser;
use logsift_cli::Cli;
use logsift_cli::run_main;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    run_main(Cli::parse()).await
}
