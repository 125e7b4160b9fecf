//! Tracing subscriber setup
//!
//! Logs go to stderr so stdout stays clean for tables and JSON. The
//! level comes from `RUST_LOG` and defaults to `warn`.

use tracing_subscriber::EnvFilter;

pub fn init(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    // Ignore a second initialization
    let _ = if json {
        builder.json().with_target(false).try_init()
    } else {
        builder.with_target(false).try_init()
    };
}
