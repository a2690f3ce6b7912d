//! Ambient building blocks shared by Portal services.
//!
//! Configuration loading, the JSON error envelope, health handlers,
//! request-id/trace layers and tracing initialization live here so every
//! service wires them the same way.

pub mod config;
pub mod error;
pub mod health;
pub mod middleware;
pub mod sea_ext;
pub mod serde;
pub mod tracing;
