pub mod email_sender;
pub mod jwt;
pub mod tags;
pub mod week;
