//! Store visit processing service
//!
//! Accepts batches of store visits, queues them on a bounded in-memory queue,
//! and processes them with a fixed pool of workers. Callers poll job status
//! and read back per-store perimeter results joined with store reference data.

pub mod app_state;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
