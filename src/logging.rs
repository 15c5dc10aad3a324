//! stderr logging via `tracing`.
//!
//! `VAULT_UPKEEP_LOG` takes an `EnvFilter` directive and wins over `--verbose`.

use std::env;
use std::sync::Once;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "VAULT_UPKEEP_LOG";

static INIT: Once = Once::new();

pub fn filter_directive(verbose: bool, from_env: Option<String>) -> String {
    match from_env.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => v,
        _ if verbose => "vault_upkeep=debug".to_string(),
        _ => "vault_upkeep=warn".to_string(),
    }
}

pub fn init(verbose: bool) {
    INIT.call_once(|| {
        let directive = filter_directive(verbose, env::var(LOG_ENV).ok());
        let filter = EnvFilter::try_new(&directive)
            .unwrap_or_else(|_| EnvFilter::new("vault_upkeep=warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    });
}
