//! User domain entity.

use serde::{Deserialize, Serialize};

/// User domain entity.
///
/// The id is assigned by the store on creation and never changed by the
/// client. Listing records use upper-case field names (`ID`, `NAME`); both
/// casings are accepted when decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "ID", alias = "id")]
    pub id: i64,
    #[serde(rename = "NAME", alias = "name")]
    pub name: String,
}

impl User {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl std::fmt::Display for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\t{}", self.id, self.name)
    }
}
