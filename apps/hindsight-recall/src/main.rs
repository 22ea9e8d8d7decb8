use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = hindsight_recall::Args::parse();

	hindsight_recall::run(args).await
}
