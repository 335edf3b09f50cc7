//! Run arbitrary executables as source-control hooks.
//!
//! Two halves: [`provision`] keeps generated wrapper scripts installed as the
//! host's native hook scripts, and [`hook`] runs the configured executable
//! in-process for pushes and merge checks through [`runner::HookRunner`].

pub mod cli;
pub mod config;
pub mod domain;
pub mod executable;
pub mod hook;
pub mod host;
pub mod license;
pub mod logging;
pub mod protocol;
pub mod provision;
pub mod runner;
pub mod script;
pub mod store;
pub mod walker;
