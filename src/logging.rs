use anyhow::Result;
use tracing_subscriber::{EnvFilter, fmt};

/// Logs go to stderr so stdout only carries resolved requests.
/// `RUST_LOG` overrides the default level.
pub fn init(verbose: bool) -> Result<()> {
    if !verbose {
        return Ok(());
    }
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("dict_lookup_rust=debug"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .try_init();
    Ok(())
}
