//! Folio CLI Library
//!
//! Command implementations for the `folio` binary, which validates a
//! portfolio content directory and prints its derived views.
//!
//! # Modules
//!
//! - [`cmd`] - Command implementations (check, show)
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! # async fn demo() -> color_eyre::Result<()> {
//! folio::cmd::check::run(Path::new("folio.toml"), false).await?;
//! # Ok(())
//! # }
//! ```

pub mod cmd;

pub use folio_content::{ContentService, MemoryStore};
pub use folio_core::Config;

/// Initialize tracing with the specified verbosity level.
///
/// # Arguments
///
/// * `verbose` - Verbosity level (0 = WARN, 1 = INFO, 2 = DEBUG, 3+ = TRACE)
pub fn init_tracing(verbose: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}
