// handlers/protected/mod.rs - Dashboard handlers behind the access gate

pub mod dashboard;
pub mod records;
