//! Integration tests for sql-seeder.

pub mod endpoint_test;
pub mod seed_test;
pub mod split_test;
