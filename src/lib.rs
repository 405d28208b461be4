pub mod config;
pub mod error;
pub mod credentials;
pub mod navigation;
pub mod notify;
pub mod activity;
pub mod identity;
pub mod gateway;
pub mod api;
pub mod routes;
pub mod server;

