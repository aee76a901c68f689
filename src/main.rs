//! sql-seeder - push SQL schema and seed scripts to a remote execution endpoint.

use std::sync::Arc;

use sql_seeder::cli::Cli;
use sql_seeder::client::{HttpExecutionClient, TracingObserver};
use sql_seeder::config::Config;
use sql_seeder::error::Result;
use sql_seeder::seeder::{self, Seeder};
use sql_seeder::{logging, script};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    // A missing .env is fine
    let _ = dotenvy::dotenv();

    match cli.log_file_path() {
        Some(path) => logging::init_file_logging(&path),
        None => logging::init_stderr_logging(),
    }

    if let Err(e) = run(cli).await {
        error!("{}: {}", e.category(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Precedence: CLI arguments, then config file, then environment
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let mut config = Config::load_from_file(&config_path)?;
    cli.apply_to(&mut config);
    config.apply_env_defaults();

    let targets = cli.targets(&config);

    if cli.dry_run {
        let scripts = script::load_all(&targets)?;
        seeder::dry_run(&scripts, &config.execution.batch_options());
        return Ok(());
    }

    let client_config = config.endpoint.to_client_config()?;
    info!(
        "Endpoint: {} (project {})",
        client_config.base_url, client_config.project_ref
    );
    let client = HttpExecutionClient::with_observer(client_config, Arc::new(TracingObserver))?;

    let summary = Seeder::new(&client, config.execution.seeder_options())
        .run(&targets)
        .await?;

    info!(
        "Done: {} batch(es), {} statement(s) executed",
        summary.reports.len(),
        summary.statements_executed()
    );
    Ok(())
}
