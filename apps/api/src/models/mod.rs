pub mod analysis;
pub mod client;
pub mod creative;
pub mod performance;
pub mod user;
