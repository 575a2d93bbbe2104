pub mod memory;
pub mod postgres;
pub mod store;

pub use memory::MemoryRecommendationStore;
pub use postgres::{create_pool, drop_schema, init_schema, PgRecommendationStore};
pub use store::RecommendationStore;

#[cfg(test)]
pub use store::MockRecommendationStore;
