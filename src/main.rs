use anyhow::Context;
use cart_client::{
    configure_tracing, construct_app_state,
    infra::{Cli, get_config_settings},
    run,
};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = get_config_settings().context("Could not read application configuration.")?;

    // Held until main returns so buffered log lines are flushed on exit.
    let _worker_guard = configure_tracing(&settings);

    let mut app_state = construct_app_state(settings, cli.token)?;

    run(&mut app_state, cli.command).await
}
