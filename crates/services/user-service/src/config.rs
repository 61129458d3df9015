//! User service configuration.

use std::env;
use std::path::PathBuf;

use common::{ConnectionMode, StoreConfig, TrustStore};

/// Principal used to connect
pub const ENV_USER: &str = "DB_USER";
/// Password of the principal
pub const ENV_PASSWORD: &str = "DB_PASSWORD";
/// Endpoint connect string, `host[:port]/database`
pub const ENV_CONNECT_STRING: &str = "DB_CONNECT_STRING";
/// Directory of trust material; enables TLS when set
pub const ENV_TRUST_STORE_DIR: &str = "DB_TRUST_STORE_DIR";
/// Passphrase of the trust material
pub const ENV_TRUST_STORE_PASSWORD: &str = "DB_TRUST_STORE_PASSWORD";
/// Schema of the routine implementations
pub const ENV_ROUTINE_MODULE: &str = "ROUTINE_MODULE";
/// Schema holding the user routines
pub const ENV_ROUTINE_GROUP: &str = "ROUTINE_GROUP";
/// Pool size; switches to pooled connections when set
pub const ENV_POOL_MAX_CONNECTIONS: &str = "DB_POOL_MAX_CONNECTIONS";
/// Connect timeout in seconds
pub const ENV_CONNECT_TIMEOUT_SECS: &str = "DB_CONNECT_TIMEOUT_SECS";

/// Load configuration from environment variables.
///
/// Unset variables fall back to local development defaults.
pub fn from_env() -> StoreConfig {
    dotenvy::dotenv().ok();
    from_lookup(|key| env::var(key).ok())
}

/// Build configuration from an arbitrary key lookup.
pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> StoreConfig {
    let defaults = StoreConfig::default();
    let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    let trust_store = non_empty(ENV_TRUST_STORE_DIR).map(|dir| TrustStore {
        dir: PathBuf::from(dir),
        passphrase: non_empty(ENV_TRUST_STORE_PASSWORD),
    });

    let mode = match non_empty(ENV_POOL_MAX_CONNECTIONS).and_then(|v| v.parse().ok()) {
        Some(max_connections) => ConnectionMode::Pooled { max_connections },
        None => ConnectionMode::PerCall,
    };

    StoreConfig {
        principal: non_empty(ENV_USER).unwrap_or(defaults.principal),
        credential: lookup(ENV_PASSWORD).unwrap_or(defaults.credential),
        connect_string: non_empty(ENV_CONNECT_STRING).unwrap_or(defaults.connect_string),
        trust_store,
        routine_group: non_empty(ENV_ROUTINE_GROUP).unwrap_or(defaults.routine_group),
        routine_module: non_empty(ENV_ROUTINE_MODULE).unwrap_or(defaults.routine_module),
        mode,
        connect_timeout_secs: non_empty(ENV_CONNECT_TIMEOUT_SECS)
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.connect_timeout_secs),
    }
}
