//! CLI support for the `snmp-query` tool.
//!
//! This module is only available with the `cli` feature.

pub mod args;
pub mod output;
