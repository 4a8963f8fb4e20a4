//! Command-line display for home sensor readings.
//!
//! The `homesens` binary reads a DHT-class temperature/humidity sensor through
//! the host kernel and, unless disabled, fetches the current radiation level
//! of a uRadMonitor device. Both are printed together in one report.
//!
//! # Modes
//!
//! | Flag | Description |
//! |------|-------------|
//! | (none) | Read sensor `-s N` and uRadMonitor, print the report |
//! | `-U` | Read the sensor only, no network access |
//! | `-l` | List detected sensors |
//!
//! # Configuration
//!
//! Settings resolve from command-line flags, then environment variables, then
//! `<config dir>/homesens/config.toml`, then built-in defaults:
//!
//! ```toml
//! sensor = 0
//! temperature_leaf = "temperature"
//! humidity_leaf = "humidity"
//! format = "text"
//!
//! [uradmon]
//! id = "82000001"
//! userid = "1234"
//! userkey = "0123abcd"
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod format;
