//! newsdesk — classified-news analytics and browsing backend.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod api;
pub mod config;
pub mod dates;
pub mod engine;
pub mod filter;
pub mod service;
pub mod storage;
pub mod types;
