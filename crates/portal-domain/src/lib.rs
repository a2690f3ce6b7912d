//! Domain types shared across Portal crates.
//!
//! This crate contains only pure types with no framework dependencies.
//! Import in `usecase/` and `domain/` layers and in clients; never in `infra/` or `handlers/`.

pub mod channel;
pub mod id;
pub mod user;
pub mod verification;
