//! Orchestration layer.
//!
//! Each submodule owns one resource's workflows: validate input, run the
//! storage queries, feed the engine reducers, and map absent rows to
//! domain errors. Handlers above stay thin; SQL stays below.

pub mod articles;
pub mod dashboard;
pub mod publishers;
pub mod weeks;
