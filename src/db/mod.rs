//! User persistence.
//!
//! [`UserStore`] is the contract the rest of the server codes against.
//! [`TursoClient`] implements it on libsql, which covers in-memory SQLite,
//! a local SQLite file and (with the `turso` feature) a remote Turso database.

pub mod traits;
pub mod turso;

pub use traits::{DatabaseProvider, UserStore};
pub use turso::TursoClient;
