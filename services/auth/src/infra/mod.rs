pub mod db;
pub mod delivery;
pub mod mail;
pub mod sms;
