//! API endpoint modules.

pub mod generate;
pub mod generations;
pub mod health;
pub mod keys;
pub mod openapi;
pub mod profile;
pub mod projects;

pub use generate::configure_routes as configure_generate_routes;
pub use generations::configure_routes as configure_generation_routes;
pub use health::configure_health_routes;
pub use keys::configure_routes as configure_key_routes;
pub use openapi::ApiDoc;
pub use profile::configure_routes as configure_profile_routes;
pub use projects::configure_routes as configure_project_routes;
