pub mod api;
pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod player;
pub mod query;
pub mod render;
pub mod services;
pub mod state;
pub mod store;
pub mod timeline;
pub mod timestamp;
