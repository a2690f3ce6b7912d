pub mod delivery;
pub mod message;
pub mod repository;
pub mod types;
