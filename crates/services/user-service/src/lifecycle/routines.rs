//! Routine definitions and the DDL that provisions them.

use once_cell::sync::Lazy;
use regex::Regex;

use common::{AppError, AppResult};
use domain::{
    BIND_AFFECTED, BIND_ID, BIND_JSON, BIND_NAME, BIND_USER, ROUTINE_CREATE, ROUTINE_DELETE,
    ROUTINE_GET, ROUTINE_LIST, ROUTINE_UPDATE, SIGNATURE_NUMBER, SIGNATURE_STRING,
};

use crate::executor::OutKind;

/// Longest identifier PostgreSQL keeps without truncation
const MAX_IDENTIFIER_LEN: usize = 63;

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier regex"));

/// Check that `value` is a plain SQL identifier safe to splice into DDL.
pub fn identifier<'a>(what: &str, value: &'a str) -> AppResult<&'a str> {
    if value.len() <= MAX_IDENTIFIER_LEN && IDENTIFIER.is_match(value) {
        Ok(value)
    } else {
        Err(AppError::config(format!(
            "{} `{}` is not a plain SQL identifier",
            what, value
        )))
    }
}

/// Type token of an input parameter in a routine signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Number,
}

impl ParamType {
    pub fn token(self) -> &'static str {
        match self {
            ParamType::String => SIGNATURE_STRING,
            ParamType::Number => SIGNATURE_NUMBER,
        }
    }

    pub fn sql_type(self) -> &'static str {
        match self {
            ParamType::String => "text",
            ParamType::Number => "bigint",
        }
    }
}

/// One stored routine: its input parameters and single OUT parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Routine {
    pub name: &'static str,
    pub params: &'static [(&'static str, ParamType)],
    pub out: (&'static str, OutKind),
}

impl Routine {
    /// Signature string, e.g. `updateUser(number, string)`.
    pub fn signature(&self) -> String {
        let tokens: Vec<&str> = self.params.iter().map(|(_, ty)| ty.token()).collect();
        format!("{}({})", self.name, tokens.join(", "))
    }

    fn definition(&self, group: &str, module: &str) -> String {
        let (out_name, out_kind) = self.out;
        let mut params: Vec<String> = self
            .params
            .iter()
            .map(|(name, ty)| format!("\"{}\" {}", name, ty.sql_type()))
            .collect();
        params.push(format!("OUT \"{}\" {}", out_name, out_kind.sql_type()));

        let args: Vec<String> = self
            .params
            .iter()
            .map(|(name, _)| format!("\"{}\"", name))
            .collect();

        format!(
            "CREATE OR REPLACE PROCEDURE {group}.{name}({params})\n\
             LANGUAGE plpgsql\n\
             AS $routine$\n\
             BEGIN\n    \"{out}\" := {module}.{name}({args});\nEND\n\
             $routine$;\n\
             COMMENT ON PROCEDURE {group}.{name} IS '{signature}';\n",
            group = group,
            module = module,
            name = self.name,
            params = params.join(", "),
            out = out_name,
            args = args.join(", "),
            signature = self.signature(),
        )
    }
}

/// The routine group, in declaration order.
pub const USER_ROUTINES: &[Routine] = &[
    Routine {
        name: ROUTINE_CREATE,
        params: &[(BIND_NAME, ParamType::String)],
        out: (BIND_ID, OutKind::Number),
    },
    Routine {
        name: ROUTINE_GET,
        params: &[(BIND_ID, ParamType::Number)],
        out: (BIND_USER, OutKind::Text),
    },
    Routine {
        name: ROUTINE_LIST,
        params: &[],
        out: (BIND_JSON, OutKind::Json),
    },
    Routine {
        name: ROUTINE_UPDATE,
        params: &[(BIND_ID, ParamType::Number), (BIND_NAME, ParamType::String)],
        out: (BIND_AFFECTED, OutKind::Number),
    },
    Routine {
        name: ROUTINE_DELETE,
        params: &[(BIND_ID, ParamType::Number)],
        out: (BIND_AFFECTED, OutKind::Number),
    },
];

/// Script declaring the routine group and the module it is bound to.
pub fn group_definition(group: &str, module: &str) -> String {
    let names: Vec<&str> = USER_ROUTINES.iter().map(|r| r.name).collect();
    format!(
        "CREATE SCHEMA IF NOT EXISTS {group};\n\
         COMMENT ON SCHEMA {group} IS 'module {module}: {routines}';\n",
        group = group,
        module = module,
        routines = names.join(", "),
    )
}

/// Script creating every routine of the group with its signature.
pub fn group_body(group: &str, module: &str) -> String {
    USER_ROUTINES
        .iter()
        .map(|routine| routine.definition(group, module))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Script dropping the routine group.
pub fn group_drop(group: &str) -> String {
    format!("DROP SCHEMA IF EXISTS {} CASCADE;\n", group)
}
