// Shot-log pipeline entry point.
//
// Run from the project directory: config/, Data/ and the output directory
// are all resolved against the current working directory.
//
// 1. Initialize tracing (stderr)
// 2. Load config, writing the built-in defaults to config/ on first run
// 3. Run the pipeline

use shotlog::config;
use shotlog::pipeline;

use anyhow::Context;
use tracing::info;

fn main() -> anyhow::Result<()> {
    init_tracing()?;
    info!("shotlog starting up");

    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: data_dir={}, pattern={}, output={}",
        config.input.data_dir.display(),
        config.input.file_pattern,
        config.output.dir.display()
    );

    let summary = pipeline::run(&config)?;
    info!("Wrote {} files", summary.written.len());
    Ok(())
}

fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("shotlog=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
