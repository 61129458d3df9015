//! Shared configuration structures.

use std::path::PathBuf;

use domain::{DEFAULT_ROUTINE_GROUP, DEFAULT_ROUTINE_MODULE};
use serde::{Deserialize, Serialize};

/// Store connection configuration.
///
/// Built once at process start and shared read-only by every call.
#[derive(Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Database principal (user name)
    pub principal: String,
    /// Password for the principal
    #[serde(skip_serializing)]
    pub credential: String,
    /// Endpoint connect string, `host[:port]/database`
    pub connect_string: String,
    /// Secure-transport materials, present only when a trust store is configured
    #[serde(default)]
    pub trust_store: Option<TrustStore>,
    /// Schema holding the user routines
    pub routine_group: String,
    /// External module implementing the routines
    pub routine_module: String,
    /// Connection strategy
    #[serde(default)]
    pub mode: ConnectionMode,
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("principal", &self.principal)
            .field("credential", &"[REDACTED]")
            .field("connect_string", &self.connect_string)
            .field("trust_store", &self.trust_store)
            .field("routine_group", &self.routine_group)
            .field("routine_module", &self.routine_module)
            .field("mode", &self.mode)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            principal: "postgres".to_string(),
            credential: "password".to_string(),
            connect_string: "localhost:5432/user_db".to_string(),
            trust_store: None,
            routine_group: DEFAULT_ROUTINE_GROUP.to_string(),
            routine_module: DEFAULT_ROUTINE_MODULE.to_string(),
            mode: ConnectionMode::default(),
            connect_timeout_secs: 10,
        }
    }
}

/// Directory of trust material plus its passphrase.
#[derive(Clone, Deserialize, Serialize)]
pub struct TrustStore {
    pub dir: PathBuf,
    #[serde(skip_serializing, default)]
    pub passphrase: Option<String>,
}

impl std::fmt::Debug for TrustStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrustStore")
            .field("dir", &self.dir)
            .field("passphrase", &self.passphrase.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// How connections are obtained for each call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ConnectionMode {
    /// Open a fresh connection per call and close it afterwards
    #[default]
    PerCall,
    /// Check connections out of a shared pool
    Pooled { max_connections: u32 },
}
