pub mod routes;
pub mod state;

use std::{net::SocketAddr, path::PathBuf};

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use crate::state::AppState;

#[derive(Debug, Parser)]
#[command(
	version = memento_cli::VERSION,
	rename_all = "kebab",
	styles = memento_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = memento_config::load(&args.config)?;

	init_tracing(&config);

	let http_addr: SocketAddr = config.service.http_bind.parse()?;
	let state = AppState::new(config)?;

	// Launch-time reconciliation: offline edits converge before the first
	// request is served.
	match state.service.sync().await {
		Ok(report) => tracing::info!(
			pushed = report.pushed,
			pulled = report.pulled,
			failed = report.failed,
			"Launch sync finished."
		),
		Err(memento_service::Error::AuthMissing) =>
			tracing::info!("No remote configured; staying local."),
		Err(err) => tracing::warn!(error = %err, "Launch sync failed."),
	}

	let app = routes::router(state);
	let listener = TcpListener::bind(http_addr).await?;

	tracing::info!(%http_addr, "HTTP server listening.");

	axum::serve(listener, app).await?;

	Ok(())
}

fn init_tracing(config: &memento_config::Config) {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).init();
}
