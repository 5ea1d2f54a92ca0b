pub mod api;
pub mod assets;
pub mod health;
pub mod pages;
pub mod reagents;

pub use api::api_routes;
pub use assets::asset_routes;
pub use health::{HealthService, health_routes};
pub use pages::page_routes;
pub use reagents::reagent_routes;
