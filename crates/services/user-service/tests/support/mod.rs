//! Shared test doubles.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sea_orm::{
    DatabaseBackend, DatabaseConnection, DbErr, ExecResult, MockDatabase,
    MockDatabaseConnection, MockDatabaseTrait, QueryResult, Statement, Transaction, Value,
};

use common::{AppError, AppResult};
use user_service_lib::infra::{Connection, ConnectionProvider};

/// Test provider handing out connections to one mock database and
/// counting every acquire and release.
pub struct CountingProvider {
    db: Option<Arc<DatabaseConnection>>,
    mock: Option<SharedMock>,
    fail_release: bool,
    acquired: AtomicUsize,
    released: AtomicUsize,
}

impl CountingProvider {
    pub fn new(db: MockDatabase) -> Arc<Self> {
        let (mock, db) = SharedMock::connect(db);
        Arc::new(Self {
            db: Some(Arc::new(db)),
            mock: Some(mock),
            fail_release: false,
            acquired: AtomicUsize::new(0),
            released: AtomicUsize::new(0),
        })
    }

    /// A provider whose releases all fail.
    pub fn failing_release(db: MockDatabase) -> Arc<Self> {
        let (mock, db) = SharedMock::connect(db);
        Arc::new(Self {
            db: Some(Arc::new(db)),
            mock: Some(mock),
            fail_release: true,
            acquired: AtomicUsize::new(0),
            released: AtomicUsize::new(0),
        })
    }

    /// A provider that cannot reach the store.
    pub fn unreachable() -> Arc<Self> {
        Arc::new(Self {
            db: None,
            mock: None,
            fail_release: false,
            acquired: AtomicUsize::new(0),
            released: AtomicUsize::new(0),
        })
    }

    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    /// Statements the mock database received since the last call.
    pub fn log(&self) -> Vec<Transaction> {
        match &self.mock {
            Some(mock) => mock
                .0
                .lock()
                .expect("mock database lock")
                .drain_transaction_log(),
            None => Vec::new(),
        }
    }
}

/// A mock database reachable both from the connection and from the test,
/// so the transaction log can be drained through a shared handle.
#[derive(Debug, Clone)]
struct SharedMock(Arc<Mutex<MockDatabase>>);

impl SharedMock {
    /// Same as `MockDatabase::into_connection`, keeping a handle to the mock.
    fn connect(db: MockDatabase) -> (Self, DatabaseConnection) {
        let mock = Self(Arc::new(Mutex::new(db)));
        let conn = DatabaseConnection::MockDatabaseConnection(Arc::new(
            MockDatabaseConnection::new(mock.clone()),
        ));
        (mock, conn)
    }

    fn inner(&self) -> std::sync::MutexGuard<'_, MockDatabase> {
        self.0.lock().expect("mock database lock")
    }
}

impl MockDatabaseTrait for SharedMock {
    fn execute(&mut self, counter: usize, stmt: Statement) -> Result<ExecResult, DbErr> {
        self.inner().execute(counter, stmt)
    }

    fn query(&mut self, counter: usize, stmt: Statement) -> Result<Vec<QueryResult>, DbErr> {
        self.inner().query(counter, stmt)
    }

    fn begin(&mut self) {
        self.inner().begin()
    }

    fn commit(&mut self) {
        self.inner().commit()
    }

    fn rollback(&mut self) {
        self.inner().rollback()
    }

    fn drain_transaction_log(&mut self) -> Vec<Transaction> {
        self.inner().drain_transaction_log()
    }

    fn get_database_backend(&self) -> DatabaseBackend {
        self.inner().get_database_backend()
    }

    fn ping(&self) -> Result<(), DbErr> {
        self.inner().ping()
    }
}

#[async_trait]
impl ConnectionProvider for CountingProvider {
    async fn acquire(&self) -> AppResult<Connection> {
        let db = self
            .db
            .clone()
            .ok_or_else(|| AppError::Connection(DbErr::Custom("connection refused".into())))?;
        self.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(Connection::shared(db))
    }

    async fn release(&self, connection: Connection) -> AppResult<()> {
        self.released.fetch_add(1, Ordering::SeqCst);
        drop(connection);
        if self.fail_release {
            return Err(AppError::Release(DbErr::Custom("close failed".into())));
        }
        Ok(())
    }
}

pub fn mock_db() -> MockDatabase {
    MockDatabase::new(DatabaseBackend::Postgres)
}

/// One result row holding a single OUT column.
pub fn out_row(name: &'static str, value: Value) -> Vec<BTreeMap<&'static str, Value>> {
    vec![BTreeMap::from([(name, value)])]
}

/// Expected log entry for a call rendered with positional values.
pub fn call(sql: &str, values: Vec<Value>) -> Transaction {
    Transaction::from_sql_and_values(DatabaseBackend::Postgres, sql, values)
}
