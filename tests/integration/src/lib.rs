//! Integration test utilities for the bridge
//!
//! Mock chat platform servers (REST API and gateway) the real clients can be
//! pointed at, plus frame fixtures.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
