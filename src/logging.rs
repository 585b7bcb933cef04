use tracing_subscriber::{EnvFilter, fmt};

pub const DEFAULT_FILTER: &str = "chat_relay=info,tower_http=info";
/// For modes where the chat loop owns the terminal.
pub const QUIET_FILTER: &str = "error";

/// Installs the global subscriber. `RUST_LOG` wins over `default_filter`.
pub fn init(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}
