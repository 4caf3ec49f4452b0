use std::io;

use prompt_runner::{PromptRunner, RunnerConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> prompt_runner::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let config = RunnerConfig::discover(".env")?;
    tracing::debug!(?config, "loaded configuration");

    let runner = PromptRunner::new(&config)?;
    runner.run(&mut io::stdout()).await?;
    Ok(())
}
