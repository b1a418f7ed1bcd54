//! `TaskBoard` HTTP service library.
//!
//! Wires the domain core to an axum HTTP surface, an in-memory document
//! store, and a TTL session store. Exposed as a library so integration
//! tests can start the full server in-process.

pub mod auth;
pub mod config;
pub mod http;
pub mod repo;
pub mod session;
pub mod store;
