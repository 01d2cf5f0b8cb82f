//! Persistence: the site registry, visit store, and admin repository.

mod cached;
mod connections;
mod memory;

#[cfg(feature = "postgres")]
pub mod entity;
#[cfg(feature = "postgres")]
mod postgres;

pub use cached::CachedSiteRepository;
pub use connections::DatabaseConfig;
pub use memory::{InMemoryAdminRepository, InMemorySiteRepository, InMemoryVisitStore};

#[cfg(feature = "postgres")]
pub use connections::connect;
#[cfg(feature = "postgres")]
pub use postgres::{PostgresAdminRepository, PostgresSiteRepository, PostgresVisitStore};
