// handlers/public/mod.rs - Handlers reachable without a session

pub mod auth;
pub mod docs;
pub mod health;
