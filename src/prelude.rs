//! Prelude module for convenient imports.
//!
//! # Usage
//!
//! ```rust,no_run
//! use snmp_query::prelude::*;
//! ```
//!
//! This imports:
//! - Query entry points: [`query`], [`query_into`], [`QueryParams`], [`Engine`], [`UdpEngine`]
//! - Core types: [`Oid`], [`Value`], [`Results`], [`Version`]
//! - Error handling: [`Error`], [`Result`]
//! - The [`oid!`] macro for compile-time OID construction

pub use crate::engine::{Engine, UdpEngine};
pub use crate::error::{Error, Result};
pub use crate::oid::Oid;
pub use crate::query::{QueryParams, query, query_into};
pub use crate::results::Results;
pub use crate::value::Value;
pub use crate::version::Version;

#[doc(no_inline)]
pub use crate::oid;
