//! User repository implementation over the stored user routines.

use async_trait::async_trait;

use common::{AppError, AppResult};
use domain::{
    User, BIND_AFFECTED, BIND_ID, BIND_JSON, BIND_NAME, BIND_USER, ROUTINE_CREATE,
    ROUTINE_DELETE, ROUTINE_GET, ROUTINE_LIST, ROUTINE_UPDATE,
};

use crate::executor::{BindSpec, CallExecutor, CallResult};
use crate::lifecycle::identifier;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
///
/// Each operation is one round trip to one stored routine. Nothing is
/// retried or batched, and no outcome below is turned into an error: a
/// zero affected count or an absent name is for the caller to judge.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a user and return the id the store assigned
    async fn create(&self, name: &str) -> AppResult<i64>;

    /// Look up a user's name; `None` if no user has this id
    async fn get_by_id(&self, id: i64) -> AppResult<Option<String>>;

    /// List every user, in the order the store returns them
    async fn list_all(&self) -> AppResult<Vec<User>>;

    /// Rename a user, returning the affected count
    async fn update(&self, id: i64, name: &str) -> AppResult<u64>;

    /// Delete a user, returning the affected count
    async fn delete(&self, id: i64) -> AppResult<u64>;
}

/// Statement text for each routine of one routine group.
#[derive(Debug, Clone)]
struct Statements {
    create: String,
    get: String,
    list: String,
    update: String,
    delete: String,
}

impl Statements {
    fn for_group(group: &str) -> Self {
        Self {
            create: format!("CALL {group}.{ROUTINE_CREATE}(:{BIND_NAME}, :{BIND_ID})"),
            get: format!("CALL {group}.{ROUTINE_GET}(:{BIND_ID}, :{BIND_USER})"),
            list: format!("CALL {group}.{ROUTINE_LIST}(:{BIND_JSON})"),
            update: format!(
                "CALL {group}.{ROUTINE_UPDATE}(:{BIND_ID}, :{BIND_NAME}, :{BIND_AFFECTED})"
            ),
            delete: format!("CALL {group}.{ROUTINE_DELETE}(:{BIND_ID}, :{BIND_AFFECTED})"),
        }
    }
}

/// Concrete implementation of UserRepository backed by the routine group
pub struct UserStore {
    executor: CallExecutor,
    statements: Statements,
}

impl UserStore {
    /// Create a repository calling the routines of `group`.
    pub fn new(executor: CallExecutor, group: &str) -> AppResult<Self> {
        let group = identifier("routine group", group)?;
        Ok(Self {
            executor,
            statements: Statements::for_group(group),
        })
    }
}

fn affected(result: &CallResult) -> AppResult<u64> {
    let count = result
        .number(BIND_AFFECTED)?
        .ok_or_else(|| AppError::marshal(BIND_AFFECTED, "expected a count, got NULL"))?;
    u64::try_from(count)
        .map_err(|_| AppError::marshal(BIND_AFFECTED, format!("negative count {}", count)))
}

#[async_trait]
impl UserRepository for UserStore {
    async fn create(&self, name: &str) -> AppResult<i64> {
        let binds = BindSpec::new().input(BIND_NAME, name).out_number(BIND_ID);
        let result = self.executor.call(&self.statements.create, binds).await?;

        let id = result
            .number(BIND_ID)?
            .ok_or_else(|| AppError::marshal(BIND_ID, "expected a number, got NULL"))?;
        tracing::debug!(id, "User created");
        Ok(id)
    }

    async fn get_by_id(&self, id: i64) -> AppResult<Option<String>> {
        let binds = BindSpec::new().input(BIND_ID, id).out_text(BIND_USER);
        let result = self.executor.call(&self.statements.get, binds).await?;

        // NULL means no such user; an empty name is still a user.
        result.text(BIND_USER)
    }

    async fn list_all(&self) -> AppResult<Vec<User>> {
        let binds = BindSpec::new().out_json(BIND_JSON);
        let result = self.executor.call(&self.statements.list, binds).await?;

        result
            .records(BIND_JSON)?
            .iter()
            .enumerate()
            .map(|(index, record)| {
                serde_json::from_value(serde_json::Value::Object(record.clone())).map_err(|e| {
                    AppError::marshal(BIND_JSON, format!("record {} is not a user: {}", index, e))
                })
            })
            .collect()
    }

    async fn update(&self, id: i64, name: &str) -> AppResult<u64> {
        let binds = BindSpec::new()
            .input(BIND_ID, id)
            .input(BIND_NAME, name)
            .out_number(BIND_AFFECTED);
        let result = self.executor.call(&self.statements.update, binds).await?;
        affected(&result)
    }

    async fn delete(&self, id: i64) -> AppResult<u64> {
        let binds = BindSpec::new().input(BIND_ID, id).out_number(BIND_AFFECTED);
        let result = self.executor.call(&self.statements.delete, binds).await?;
        affected(&result)
    }
}
