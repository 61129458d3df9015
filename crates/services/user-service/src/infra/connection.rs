//! Connection handles and scoped acquisition.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::DatabaseConnection;

use common::AppResult;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Exclusively owned handle to the store.
///
/// Not `Clone`: the call that acquired it owns it until it is handed back
/// through [`ConnectionProvider::release`], which consumes it. Pooled
/// providers share the underlying pool, so the handle wraps an `Arc`.
#[derive(Debug)]
pub struct Connection {
    db: Arc<DatabaseConnection>,
}

impl Connection {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db: Arc::new(db) }
    }

    /// Wrap a connection that is shared with its provider.
    pub fn shared(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Borrow the underlying sea-orm connection.
    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn into_inner(self) -> Arc<DatabaseConnection> {
        self.db
    }
}

/// Connection provider trait for dependency injection.
///
/// Implementations hold their configuration; every `acquire` returns a
/// connection that no other in-flight call can observe.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ConnectionProvider: Send + Sync {
    /// Obtain a connection to the store
    async fn acquire(&self) -> AppResult<Connection>;

    /// Return a connection obtained from `acquire`
    async fn release(&self, connection: Connection) -> AppResult<()>;
}

/// Run `f` with a connection borrowed from `provider`.
///
/// The connection is released on every exit path. A failed release is
/// logged and never replaces the outcome of `f`.
pub async fn with_connection<F, T>(provider: &dyn ConnectionProvider, f: F) -> AppResult<T>
where
    F: for<'a> FnOnce(
            &'a Connection,
        ) -> Pin<Box<dyn Future<Output = AppResult<T>> + Send + 'a>>
        + Send,
    T: Send,
{
    let connection = provider.acquire().await?;
    tracing::debug!("Connection acquired");

    let outcome = f(&connection).await;

    match provider.release(connection).await {
        Ok(()) => tracing::debug!("Connection released"),
        Err(release_err) => {
            tracing::warn!(
                error = %release_err,
                call_failed = outcome.is_err(),
                "Connection release failed"
            );
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::AppError;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase};

    fn mock_connection() -> Connection {
        Connection::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    #[tokio::test]
    async fn releases_after_success() {
        let mut provider = MockConnectionProvider::new();
        provider
            .expect_acquire()
            .times(1)
            .returning(|| Ok(mock_connection()));
        provider.expect_release().times(1).returning(|_| Ok(()));

        let value = with_connection(&provider, |_| Box::pin(async { Ok(7) }))
            .await
            .unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn releases_after_failure() {
        let mut provider = MockConnectionProvider::new();
        provider
            .expect_acquire()
            .times(1)
            .returning(|| Ok(mock_connection()));
        provider.expect_release().times(1).returning(|_| Ok(()));

        let err = with_connection(&provider, |_| {
            Box::pin(async { Err::<(), _>(AppError::Execution(DbErr::Custom("boom".into()))) })
        })
        .await
        .unwrap_err();
        assert!(err.is_execution_error());
    }

    #[tokio::test]
    async fn release_failure_does_not_mask_outcome() {
        let mut provider = MockConnectionProvider::new();
        provider
            .expect_acquire()
            .returning(|| Ok(mock_connection()));
        provider
            .expect_release()
            .times(1)
            .returning(|_| Err(AppError::Release(DbErr::Custom("close failed".into()))));

        let value = with_connection(&provider, |_| Box::pin(async { Ok("done") }))
            .await
            .unwrap();
        assert_eq!(value, "done");

        let mut provider = MockConnectionProvider::new();
        provider
            .expect_acquire()
            .returning(|| Ok(mock_connection()));
        provider
            .expect_release()
            .returning(|_| Err(AppError::Release(DbErr::Custom("close failed".into()))));

        let err = with_connection(&provider, |_| {
            Box::pin(async { Err::<(), _>(AppError::bind("bad")) })
        })
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Bind(_)));
    }

    #[tokio::test]
    async fn acquire_failure_skips_release() {
        let mut provider = MockConnectionProvider::new();
        provider.expect_acquire().times(1).returning(|| {
            Err(AppError::Connection(DbErr::Custom("refused".into())))
        });
        provider.expect_release().never();

        let err = with_connection(&provider, |_| Box::pin(async { Ok(()) }))
            .await
            .unwrap_err();
        assert!(err.is_connection_error());
    }
}
