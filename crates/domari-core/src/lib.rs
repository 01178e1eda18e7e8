//! Domari Core — domain models, repository trait definitions, and the
//! tenant-scoped access policy shared by every other crate.
//!
//! Nothing in this crate touches the database or the network. The
//! financial and lifecycle arithmetic lives here as pure functions so
//! the invariants can be tested without any I/O.

pub mod context;
pub mod error;
pub mod models;
pub mod query;
pub mod repository;

pub use context::{AuthContext, Role, ensure_same_org, require_role};
pub use error::{DomariError, DomariResult};
