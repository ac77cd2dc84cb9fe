pub mod health;
pub mod profile;
pub mod tickets;
pub mod whoami;
