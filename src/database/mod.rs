pub mod fixture;
pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod store;

pub use fixture::{Fixtures, SeedReport};
pub use manager::{DatabaseManager, StoreError};
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use repository::Repository;
pub use store::{ContentStore, Row};
