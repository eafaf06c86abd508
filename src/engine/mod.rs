//! The aggregation and navigation engine.
//!
//! Every function in here is a pure, deterministic reducer over an
//! article row set: same filter, same snapshot, same output, regardless
//! of the underlying storage. Storage access and transaction handling
//! live in the service layer.

pub mod aggregator;
pub mod navigator;
pub mod patch;
pub mod ranker;
