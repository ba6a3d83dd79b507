use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = memento_worker::Args::parse();

	memento_worker::run(args).await
}
