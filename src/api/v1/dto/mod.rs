pub mod profile;
pub mod tickets;
