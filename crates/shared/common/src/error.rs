//! Unified error handling for the data-access layer.
//!
//! Errors fall into three classes:
//! - connection errors, raised while acquiring a connection
//! - execution errors, raised by the store for a submitted statement
//! - release errors, raised while returning a connection (always secondary)
//!
//! The remaining variants are raised locally, before or after the round trip.

use thiserror::Error;

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    // Connection
    #[cfg(feature = "database")]
    #[error("Connection error: {0}")]
    Connection(#[source] sea_orm::DbErr),

    #[error("Trust material error: {0}")]
    TrustMaterial(String),

    // Execution
    #[cfg(feature = "database")]
    #[error("Execution error: {0}")]
    Execution(#[source] sea_orm::DbErr),

    // Release
    #[cfg(feature = "database")]
    #[error("Release error: {0}")]
    Release(#[source] sea_orm::DbErr),

    // Local failures
    #[error("Bind error: {0}")]
    Bind(String),

    #[error("OUT bind `{bind}` could not be marshalled: {reason}")]
    Marshal { bind: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Scenario failed: {0}")]
    Scenario(String),
}

impl AppError {
    /// Get error code for reporting
    pub fn code(&self) -> &'static str {
        match self {
            #[cfg(feature = "database")]
            AppError::Connection(_) => "CONNECTION_ERROR",
            AppError::TrustMaterial(_) => "TRUST_MATERIAL_ERROR",
            #[cfg(feature = "database")]
            AppError::Execution(_) => "EXECUTION_ERROR",
            #[cfg(feature = "database")]
            AppError::Release(_) => "RELEASE_ERROR",
            AppError::Bind(_) => "BIND_ERROR",
            AppError::Marshal { .. } => "MARSHAL_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Scenario(_) => "SCENARIO_ERROR",
        }
    }

    /// Whether the error was raised while acquiring a connection
    pub fn is_connection_error(&self) -> bool {
        match self {
            #[cfg(feature = "database")]
            AppError::Connection(_) => true,
            AppError::TrustMaterial(_) => true,
            _ => false,
        }
    }

    /// Whether the store rejected the submitted statement
    pub fn is_execution_error(&self) -> bool {
        #[cfg(feature = "database")]
        if let AppError::Execution(_) = self {
            return true;
        }
        false
    }

    /// Get the diagnostic reported by the store, if any
    #[cfg(feature = "database")]
    pub fn store_diagnostic(&self) -> Option<&sea_orm::DbErr> {
        match self {
            AppError::Connection(e) | AppError::Execution(e) | AppError::Release(e) => Some(e),
            _ => None,
        }
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Convenience constructors
impl AppError {
    pub fn trust_material(msg: impl Into<String>) -> Self {
        AppError::TrustMaterial(msg.into())
    }

    pub fn bind(msg: impl Into<String>) -> Self {
        AppError::Bind(msg.into())
    }

    pub fn marshal(bind: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::Marshal {
            bind: bind.into(),
            reason: reason.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        AppError::Config(msg.into())
    }

    pub fn scenario(msg: impl Into<String>) -> Self {
        AppError::Scenario(msg.into())
    }
}
