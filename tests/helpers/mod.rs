//! Shared integration test fixtures.

pub mod database;
