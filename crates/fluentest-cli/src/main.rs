use clap::{CommandFactory, Parser};
use tokio_util::sync::CancellationToken;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use fluentest_cli::handlers::{self, probe::ProbeArgs};
use fluentest_cli::{Cli, CliConfig, Commands, bootstrap};

use std::time::Duration;

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Cancel `token` on the first Ctrl-C.
fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => token.cancel(),
            Err(e) => warn!(error = %e, "Failed to listen for Ctrl-C"),
        }
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables before clap reads `env` defaults
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let Some(command) = cli.command.as_ref() else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let ctx = bootstrap(&CliConfig::from_cli(&cli))?;
    let cancel = CancellationToken::new();
    cancel_on_ctrl_c(cancel.clone());

    match command {
        Commands::Up { file } => handlers::up::execute(&ctx, file, &cancel).await?,
        Commands::Run { file } => handlers::run::execute(&ctx, file, &cancel).await?,
        Commands::Down { file } => handlers::down::execute(&ctx, file).await?,
        Commands::Status { json } => handlers::status::execute(&ctx, *json).await?,
        Commands::Sweep => handlers::sweep::execute(&ctx).await?,
        Commands::Hash { file } => handlers::hash::execute(file)?,
        Commands::Probe {
            url,
            endpoints,
            timeout_ms,
            poll_ms,
        } => {
            let args = ProbeArgs {
                url: url.clone(),
                endpoints: endpoints.clone(),
                timeout: Duration::from_millis(*timeout_ms),
                poll_interval: Duration::from_millis(*poll_ms),
            };
            handlers::probe::execute(&ctx, &args, &cancel).await?;
        }
        Commands::Paths => handlers::paths::execute(&ctx)?,
    }

    Ok(())
}
