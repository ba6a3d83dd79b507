pub mod worker;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use memento_service::MementoService;
use memento_storage::cache::NoteCache;

#[derive(Debug, Parser)]
#[command(
	version = memento_cli::VERSION,
	rename_all = "kebab",
	styles = memento_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: std::path::PathBuf,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = memento_config::load(&args.config)?;
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).init();

	let cache = NoteCache::open(&config.cache.path)?;
	let service = MementoService::new(config, cache)?;

	worker::run_worker(worker::WorkerState { service }).await
}
