//! Domain-level constants.
//!
//! Routine and bind parameter names are part of the wire contract with the
//! stored routine group and must match the routine signatures exactly.

// =============================================================================
// Routine group
// =============================================================================

/// Default name of the schema holding the user routines
pub const DEFAULT_ROUTINE_GROUP: &str = "user_pkg";

/// Default name of the external module implementing the routines
pub const DEFAULT_ROUTINE_MODULE: &str = "user_module";

/// Creates a user and returns its store-assigned id
pub const ROUTINE_CREATE: &str = "newUserFunc";

/// Looks up a user's name by id
pub const ROUTINE_GET: &str = "getUser";

/// Returns every user as a JSON array
pub const ROUTINE_LIST: &str = "getAllUsers";

/// Renames a user, reporting the affected count
pub const ROUTINE_UPDATE: &str = "updateUser";

/// Deletes a user, reporting the affected count
pub const ROUTINE_DELETE: &str = "deleteUser";

/// All routines of the group, in declaration order
pub const ROUTINES: &[&str] = &[
    ROUTINE_CREATE,
    ROUTINE_GET,
    ROUTINE_LIST,
    ROUTINE_UPDATE,
    ROUTINE_DELETE,
];

// =============================================================================
// Bind parameters
// =============================================================================

pub const BIND_ID: &str = "id";
pub const BIND_NAME: &str = "name";
pub const BIND_USER: &str = "user";
pub const BIND_AFFECTED: &str = "affected";
pub const BIND_JSON: &str = "json";

// =============================================================================
// Signature tokens
// =============================================================================

/// Signature token for text parameters
pub const SIGNATURE_STRING: &str = "string";

/// Signature token for numeric parameters
pub const SIGNATURE_NUMBER: &str = "number";
