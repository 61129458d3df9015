//! Bindings and statement rendering.
//!
//! Statements name their parameters with `:name` placeholders. Rendering
//! rewrites IN placeholders into positional `$n` parameters and OUT
//! placeholders into typed `NULL` arguments, whose values the store returns
//! as columns of the result row.

use std::collections::{BTreeMap, HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use sea_orm::Value;

use common::{AppError, AppResult};

/// Matches single-quoted literals, comments and `::` casts (left untouched)
/// and named placeholders (captured).
static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"'(?:[^']|'')*'|--[^\n]*|/\*[\s\S]*?\*/|::|:([A-Za-z_][A-Za-z0-9_]*)")
        .expect("placeholder regex")
});

/// Literal input value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scalar {
    Number(i64),
    Text(String),
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Number(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl From<Scalar> for Value {
    fn from(scalar: Scalar) -> Self {
        match scalar {
            Scalar::Number(n) => Value::from(n),
            Scalar::Text(s) => Value::from(s),
        }
    }
}

/// Declared type of an OUT parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutKind {
    Number,
    Text,
    Json,
}

impl OutKind {
    /// Column type of the OUT parameter in routine definitions
    pub fn sql_type(self) -> &'static str {
        match self {
            OutKind::Number => "bigint",
            OutKind::Text => "text",
            OutKind::Json => "json",
        }
    }

    /// Typed `NULL` passed in the OUT parameter's position
    fn placeholder(self) -> &'static str {
        match self {
            OutKind::Number => "NULL::bigint",
            OutKind::Text => "NULL::text",
            OutKind::Json => "NULL::json",
        }
    }
}

/// One binding of a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bind {
    ScalarIn(Scalar),
    OutNumber,
    OutText,
    OutJson,
}

/// Parameter name to binding, unique per call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindSpec {
    binds: BTreeMap<String, Bind>,
}

impl BindSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(self, name: &str, value: impl Into<Scalar>) -> Self {
        self.with(name, Bind::ScalarIn(value.into()))
    }

    pub fn out_number(self, name: &str) -> Self {
        self.with(name, Bind::OutNumber)
    }

    pub fn out_text(self, name: &str) -> Self {
        self.with(name, Bind::OutText)
    }

    pub fn out_json(self, name: &str) -> Self {
        self.with(name, Bind::OutJson)
    }

    /// Add or replace the binding for `name`.
    pub fn with(mut self, name: &str, bind: Bind) -> Self {
        self.binds.insert(name.to_string(), bind);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Bind> {
        self.binds.get(name)
    }

    pub fn len(&self) -> usize {
        self.binds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.binds.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Bind)> {
        self.binds.iter().map(|(name, bind)| (name.as_str(), bind))
    }
}

/// A statement ready for submission.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedCall {
    pub sql: String,
    pub values: Vec<Value>,
    /// OUT parameters in order of first appearance
    pub outs: Vec<(String, OutKind)>,
}

/// Rewrite `statement` against `binds`.
///
/// Every placeholder must be bound and every binding must be used.
pub fn render(statement: &str, binds: &BindSpec) -> AppResult<RenderedCall> {
    let mut values = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut outs: Vec<(String, OutKind)> = Vec::new();
    let mut used: HashSet<String> = HashSet::new();
    let mut unbound: Vec<String> = Vec::new();

    let sql = PLACEHOLDER.replace_all(statement, |caps: &Captures| {
        let Some(name) = caps.get(1).map(|m| m.as_str()) else {
            return caps[0].to_string();
        };
        used.insert(name.to_string());

        match binds.get(name) {
            None => {
                unbound.push(name.to_string());
                caps[0].to_string()
            }
            Some(Bind::ScalarIn(value)) => {
                let position = *positions.entry(name.to_string()).or_insert_with(|| {
                    values.push(Value::from(value.clone()));
                    values.len()
                });
                format!("${}", position)
            }
            Some(Bind::OutNumber) => record_out(&mut outs, name, OutKind::Number),
            Some(Bind::OutText) => record_out(&mut outs, name, OutKind::Text),
            Some(Bind::OutJson) => record_out(&mut outs, name, OutKind::Json),
        }
    });

    if !unbound.is_empty() {
        return Err(AppError::bind(format!(
            "no binding for placeholder(s) :{}",
            unbound.join(", :")
        )));
    }

    let unused: Vec<&str> = binds
        .iter()
        .map(|(name, _)| name)
        .filter(|name| !used.contains(*name))
        .collect();
    if !unused.is_empty() {
        return Err(AppError::bind(format!(
            "binding(s) not referenced by the statement: {}",
            unused.join(", ")
        )));
    }

    Ok(RenderedCall {
        sql: sql.into_owned(),
        values,
        outs,
    })
}

fn record_out(outs: &mut Vec<(String, OutKind)>, name: &str, kind: OutKind) -> String {
    if !outs.iter().any(|(out, _)| out == name) {
        outs.push((name.to_string(), kind));
    }
    kind.placeholder().to_string()
}
