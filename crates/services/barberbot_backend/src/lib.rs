pub mod app_state;
#[cfg(feature = "openapi")]
pub mod doc;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod service_factory;

pub use app_state::AppState;
pub use routes::{app, routes};
pub use service_factory::BarberbotServiceFactory;
