//! Statement execution over scoped connections.

mod bind;
mod call;
mod script;

pub use bind::{render, Bind, BindSpec, OutKind, RenderedCall, Scalar};
pub use call::{parse_records, CallExecutor, CallResult, OutValue, Record};
pub use script::ScriptExecutor;
