pub mod analyzers;
pub mod broadcast;
pub mod config;
pub mod error;
pub mod models;
pub mod output;
pub mod server;
pub mod services;
pub mod store;
