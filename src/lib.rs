pub mod api;
pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod middleware;
pub mod router;
pub mod scheduler;
pub mod session;

#[cfg(test)]
pub mod testing;
