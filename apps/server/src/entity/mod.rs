//! SeaORM entity definitions for PostgreSQL database.

pub mod generation;
pub mod model_preference;
pub mod profile;
pub mod project;
pub mod provider_key;
pub mod usage_record;
