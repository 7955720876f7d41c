//! The `common` crate provides the pieces shared by the VM bootstrap tools: the logging shim,
//! the [`CommandRunner`] capability used to call out to package managers and ansible, and the
//! staged procedure runner which turns a list of steps into a single [`ProcedureReport`] or
//! [`ProcedureFailure`].
//!
//! [`CommandRunner`]: command::CommandRunner
//! [`ProcedureReport`]: procedure::ProcedureReport
//! [`ProcedureFailure`]: procedure::ProcedureFailure

pub mod clap;
pub mod command;
mod error;
pub mod preflight;
pub mod procedure;
pub mod system;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
pub mod tracing;

pub use error::Error;
