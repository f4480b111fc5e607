use clap::Parser;
use lectern_cli::CliArgs;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    lectern_cli::run(args).await?;
    Ok(())
}
