pub mod client;
pub mod config;
pub mod coordinator;
pub mod gateway;
pub mod guard;
pub mod model;
pub mod store;
pub mod telemetry;

pub use client::Client;
