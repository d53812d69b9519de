//! Core library for labelbridge: marketplace order listing and the
//! asynchronous carrier label-acquisition workflow.
//!
//! The HTTP surface lives in the companion server crate; everything here is
//! transport-agnostic business logic behind trait seams.

pub mod account;
pub mod carrier;
pub mod config;
pub mod marketplace;
pub mod orchestrator;
pub mod testing;
pub mod workflow;

pub use config::{load_config, validate_config, Config};
