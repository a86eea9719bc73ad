pub mod messages;
pub mod orders;
pub mod products;
pub mod uploads;
pub mod users;
pub mod verifications;
