pub mod auth;
pub mod carrier;
pub mod config;
pub mod error;
pub mod logging;
pub mod orders;
pub mod routes;
pub mod state;
