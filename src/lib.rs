pub mod app;
pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod extract;
pub mod patch;
pub mod state;
pub mod store;
pub mod todos;
pub mod users;
