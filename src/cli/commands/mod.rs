pub mod auth;
pub mod badcase;
pub mod dashboard;
pub mod questions;
pub mod route;
pub mod scheduler;
