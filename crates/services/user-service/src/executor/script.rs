//! Script executor - administrative scripts without bindings.

use std::sync::Arc;

use sea_orm::ConnectionTrait;

use common::{AppError, AppResult};

use crate::infra::{with_connection, ConnectionProvider};

/// Runs setup/teardown scripts over a borrowed connection.
///
/// The script is submitted as one unit and every statement in it takes
/// effect immediately; no transaction spans two runs.
#[derive(Clone)]
pub struct ScriptExecutor {
    provider: Arc<dyn ConnectionProvider>,
}

impl ScriptExecutor {
    pub fn new(provider: Arc<dyn ConnectionProvider>) -> Self {
        Self { provider }
    }

    /// Submit `script`, releasing the connection whether it succeeds or not.
    pub async fn run(&self, script: &str) -> AppResult<()> {
        let script = script.to_owned();
        tracing::debug!(bytes = script.len(), "Submitting script");

        with_connection(self.provider.as_ref(), move |connection| {
            Box::pin(async move {
                connection
                    .db()
                    .execute_unprepared(&script)
                    .await
                    .map_err(AppError::Execution)?;
                Ok(())
            })
        })
        .await
    }
}
