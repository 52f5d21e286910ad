// Library exports for testing
pub mod auth;
pub mod config;
pub mod handlers;
pub mod models;
pub mod persistence;
pub mod session;
