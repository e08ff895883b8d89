pub mod auth;
pub mod cli;
pub mod config;
pub mod content;
pub mod database;
pub mod editor;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod middleware;
pub mod server;
pub mod state;
