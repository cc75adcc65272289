//! Query primitives and their dispatcher.
//!
//! A caller sends one [`Query`]; the [`Dispatcher`] resolves the relevant
//! roots, delegates to the tree, access, registry and scanner layers, and
//! returns one JSON value. Caller mistakes come back inline as
//! [`ErrorResponse`] objects with hints, absence comes back as empty
//! results, and nothing is thrown across the boundary.

mod artifact;
mod audit;
mod dispatcher;
mod documents;
mod knowledge;
mod layout;
mod search;
mod types;

use serde::Serialize;
use serde_json::Value;

pub use artifact::Artifact;
pub use audit::{get_audit, AuditFilter, AUDIT_TYPES, SEVERITIES};
pub use dispatcher::{Dispatcher, QUERY_OPS};
pub use documents::{get_decisions, get_doc};
pub use knowledge::{list_knowledge, read_knowledge};
pub use layout::Layout;
pub use search::{search, SearchScope};
pub use types::*;

fn to_value<T: Serialize>(value: &T) -> Result<Value, ErrorResponse> {
    serde_json::to_value(value).map_err(|e| {
        tracing::warn!(error = %e, "Failed to serialize response");
        ErrorResponse::new("Failed to serialize response")
    })
}
