pub mod account;
pub mod code;
pub mod password;
pub mod session;
pub mod two_factor;
pub mod verification;
