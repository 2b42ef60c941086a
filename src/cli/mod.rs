//! Command-line interface for music-data.
//!
//! This module provides the query commands (`artist`, `album`, `lyrics`)
//! driving the cache-first service without any server in front of it.

mod commands;

pub use commands::{Cli, Commands, run_command};
