//! displayd library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`,
//! the binary entry point in `main.rs`, and an RPC transport embedding the
//! engine share the same module tree.

pub mod application;
pub mod infrastructure;
