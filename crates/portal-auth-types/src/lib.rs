//! Session types shared by the Portal auth service and its consumers.
//!
//! Provides JWT validation, cookie builders, and the `SessionIdentity` extractor.

pub mod cookie;
pub mod session;
pub mod token;
