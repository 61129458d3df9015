//! Bound call executor - stored-routine invocations with IN/OUT bindings.

use std::collections::HashMap;
use std::sync::Arc;

use sea_orm::{ConnectionTrait, QueryResult, Statement};
use serde_json::{Map, Value as Json};

use common::{AppError, AppResult};

use super::bind::{render, BindSpec, OutKind, RenderedCall};
use crate::infra::{with_connection, ConnectionProvider};

/// One record of a structured JSON OUT value.
pub type Record = Map<String, Json>;

/// Marshalled value of an OUT binding.
#[derive(Debug, Clone, PartialEq)]
pub enum OutValue {
    Number(Option<i64>),
    Text(Option<String>),
    Records(Vec<Record>),
}

/// Outcome of a call: every OUT binding by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallResult {
    pub out_binds: HashMap<String, OutValue>,
}

impl CallResult {
    /// Numeric OUT value; `None` when the store returned NULL.
    pub fn number(&self, name: &str) -> AppResult<Option<i64>> {
        match self.out_binds.get(name) {
            Some(OutValue::Number(value)) => Ok(*value),
            other => Err(mismatch(name, "number", other)),
        }
    }

    /// Text OUT value; `None` when the store returned NULL.
    pub fn text(&self, name: &str) -> AppResult<Option<String>> {
        match self.out_binds.get(name) {
            Some(OutValue::Text(value)) => Ok(value.clone()),
            other => Err(mismatch(name, "text", other)),
        }
    }

    /// Structured OUT value as an ordered sequence of records.
    pub fn records(&self, name: &str) -> AppResult<&[Record]> {
        match self.out_binds.get(name) {
            Some(OutValue::Records(records)) => Ok(records),
            other => Err(mismatch(name, "records", other)),
        }
    }
}

fn mismatch(name: &str, wanted: &str, found: Option<&OutValue>) -> AppError {
    let reason = match found {
        None => "no such OUT binding".to_string(),
        Some(value) => format!("expected {}, found {:?}", wanted, value),
    };
    AppError::marshal(name, reason)
}

/// Runs parameterized stored-routine calls.
///
/// Every call acquires its own connection and releases it on every exit
/// path. Failures are surfaced unchanged; nothing is retried.
#[derive(Clone)]
pub struct CallExecutor {
    provider: Arc<dyn ConnectionProvider>,
}

impl CallExecutor {
    pub fn new(provider: Arc<dyn ConnectionProvider>) -> Self {
        Self { provider }
    }

    /// Submit `statement` with `binds` and marshal its OUT bindings.
    ///
    /// Bind mismatches are reported before any connection is acquired.
    pub async fn call(&self, statement: &str, binds: BindSpec) -> AppResult<CallResult> {
        let RenderedCall { sql, values, outs } = render(statement, &binds)?;
        tracing::debug!(statement, "Submitting call");

        with_connection(self.provider.as_ref(), move |connection| {
            Box::pin(async move {
                let db = connection.db();
                let stmt = Statement::from_sql_and_values(db.get_database_backend(), sql, values);

                if outs.is_empty() {
                    db.execute(stmt).await.map_err(AppError::Execution)?;
                    return Ok(CallResult::default());
                }

                let row = db
                    .query_one(stmt)
                    .await
                    .map_err(AppError::Execution)?
                    .ok_or_else(|| {
                        AppError::marshal(&outs[0].0, "the call returned no row of OUT values")
                    })?;

                let mut out_binds = HashMap::with_capacity(outs.len());
                for (name, kind) in outs {
                    let value = marshal(&row, &name, kind)?;
                    out_binds.insert(name, value);
                }

                Ok(CallResult { out_binds })
            })
        })
        .await
    }
}

fn marshal(row: &QueryResult, name: &str, kind: OutKind) -> AppResult<OutValue> {
    let column_err = |e: sea_orm::DbErr| AppError::marshal(name, e.to_string());

    match kind {
        OutKind::Number => row
            .try_get::<Option<i64>>("", name)
            .map(OutValue::Number)
            .map_err(column_err),
        OutKind::Text => row
            .try_get::<Option<String>>("", name)
            .map(OutValue::Text)
            .map_err(column_err),
        OutKind::Json => {
            let raw = row.try_get::<Option<Json>>("", name).map_err(column_err)?;
            parse_records(name, raw.unwrap_or(Json::Null)).map(OutValue::Records)
        }
    }
}

/// Turn a JSON OUT value into records.
///
/// `NULL` is the empty sequence; a string is parsed as JSON text first.
pub fn parse_records(name: &str, value: Json) -> AppResult<Vec<Record>> {
    let value = match value {
        Json::String(text) => serde_json::from_str(&text)
            .map_err(|e| AppError::marshal(name, format!("invalid JSON text: {}", e)))?,
        other => other,
    };

    match value {
        Json::Null => Ok(Vec::new()),
        Json::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                Json::Object(record) => Ok(record),
                other => Err(AppError::marshal(
                    name,
                    format!("element {} is not a record: {}", index, other),
                )),
            })
            .collect(),
        other => Err(AppError::marshal(
            name,
            format!("expected a JSON array, got {}", other),
        )),
    }
}
