//! Core types and trait definitions for the Garrison access layer.
//!
//! This crate is deliberately free of HTTP and database dependencies. It owns
//! the session token format, the principal model, the role areas, the
//! resolver that turns a stored credential into a principal, and the
//! maintenance gate.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod area;
pub mod error;
pub mod leave;
pub mod maintenance;
pub mod principal;
pub mod resolve;
pub mod session;
pub mod store;

pub use error::{Error, Result};
