pub mod amount;
pub mod api;
pub mod config;
pub mod detector;
pub mod error;
pub mod membership;
pub mod models;
pub mod replay;
pub mod upstream;
