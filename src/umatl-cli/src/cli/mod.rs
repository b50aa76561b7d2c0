//! CLI argument definitions for umatl
//!
//! This module contains all clap-derived structs and enums for CLI parsing.

mod core;

pub use core::{Cli, Commands, ExtractArgs};
