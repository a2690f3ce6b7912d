//! sea-orm entities owned by the Portal auth service.

pub mod users;
pub mod verifications;
