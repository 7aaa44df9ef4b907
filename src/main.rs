use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use reportwatch::cli;

/// `RUST_LOG` wins; otherwise crate-level info, or debug with `--verbose`.
fn init_logging(verbose: bool) {
    let fallback = if verbose {
        "reportwatch=debug"
    } else {
        "reportwatch=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env must be loaded before settings and the log filter are read
    let _ = dotenvy::dotenv();
    init_logging(cli::is_verbose());

    cli::run().await
}
