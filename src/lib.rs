//! Clinical risk and integration scheduling rules for a three-phase
//! psychedelic-assisted therapy protocol.
//!
//! The engine (`severity`, `risk`, `integration`) is a set of pure functions
//! over plain data. `intake`, `report`, `config` and `telemetry` support the
//! command-line tool built on top of it.

pub mod config;
pub mod intake;
pub mod integration;
pub mod models;
pub mod report;
pub mod risk;
pub mod severity;
pub mod telemetry;
