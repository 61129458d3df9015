//! Domain layer - Core entities and the stored-routine contract.
//!
//! This crate has no infrastructure dependencies. It names the user entity
//! and the routine/bind identifiers that form the compatibility surface with
//! the stored routine group.

pub mod constants;
pub mod user;

pub use constants::*;
pub use user::User;
