//! Test utilities for Portal crates.
//!
//! Contract fixture loader, signed session cookies and an in-process stub
//! HTTP server. Use from tests only.

pub mod auth;
pub mod fixture;
pub mod server;
