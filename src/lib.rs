/*
 * Responsibility
 * - Library root: JWT verification, credential store and the demo HTTP surface
 * - The binary (main.rs) only calls app::run()
 */
pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;

#[cfg(test)]
mod testutil;
