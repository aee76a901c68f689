//! sql-seeder - push SQL schema and seed scripts to a remote execution endpoint.
//!
//! Large scripts are split into statements and sent one at a time, in order,
//! stopping at the first failure. This library exposes the core modules for
//! the binary and for integration tests.

pub mod batch;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod script;
pub mod seeder;
pub mod splitter;
