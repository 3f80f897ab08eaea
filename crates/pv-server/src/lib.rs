//! procviz server: library crate for the live trace broadcast service.
//!
//! Re-exports all modules so the binaries and external crates
//! (e.g. `pv-e2e-tests`) can reach `AppState`, `build_router`, the
//! ingestion pipeline and the flush timers.

pub mod config;
pub mod control;
pub mod flush;
pub mod hub;
pub mod pipeline;
pub mod routes;
pub mod state;
