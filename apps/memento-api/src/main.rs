use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = memento_api::Args::parse();

	memento_api::run(args).await
}
