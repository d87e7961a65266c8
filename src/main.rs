use anyhow::Context;
use clap::Parser;
use ppp_processor::cli::Args;
use ppp_processor::{BatchProcessor, ProcessingConfig};
use std::process;

fn main() {
    let args = Args::parse();
    setup_logging(&args);

    match run(&args) {
        Ok(_stats) => {
            // Summary has already been printed by the processor.
            process::exit(0);
        }
        Err(error) => {
            eprintln!("Error: {error:#}");
            process::exit(1);
        }
    }
}

fn run(args: &Args) -> anyhow::Result<ppp_processor::BatchStats> {
    let mut config = ProcessingConfig::from_yaml_file(&args.config)
        .with_context(|| format!("loading configuration {}", args.config.display()))?;

    if args.update {
        config.update_pos = true;
    }

    let processor = BatchProcessor::new(config)?;
    let stats = processor.run()?;
    Ok(stats)
}

/// Set up structured logging on stderr; `RUST_LOG` overrides the CLI level.
fn setup_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ppp_processor={}", args.log_level())));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stderr),
        )
        .init();
}
