//! Query latency benchmarks over SQLite.
//!
//! Two access strategies are compared throughout: a typed model layer that
//! builds SQL and maps rows to structs ([`model`]), and hand-written SQL that
//! reads positional tuples. Scenarios vary table size, indexing, and joined
//! relationships; timings are taken by the `harness` crate.

pub mod cli;
pub mod config;
pub mod model;
pub mod populate;
pub mod query;
pub mod relations;
pub mod report;
pub mod scenario;
pub mod store;
