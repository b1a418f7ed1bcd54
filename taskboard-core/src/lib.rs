//! Domain core for the `TaskBoard` service.
//!
//! Pure logic only -- no I/O, no clock access, no store handles. The server
//! crate wires these pieces to an HTTP surface and a document store:
//!
//! - [`validate`]: raw task input -> canonical draft, collecting violations.
//! - [`policy`]: ownership/role rules and the mandatory list scope filter.
//! - [`query`]: filter/sort/pagination composition with deterministic output.
//! - [`task`] / [`user`]: the canonical records and closed enumerations.
//! - [`error`]: the service-wide error taxonomy.

pub mod error;
pub mod policy;
pub mod query;
pub mod task;
pub mod user;
pub mod validate;
