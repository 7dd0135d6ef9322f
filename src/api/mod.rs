//! Label Registry HTTP API Module
//! REST API for generating, listing, editing and deleting labels

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod types;

pub use handlers::AppState;
pub use routes::create_router;
pub use types::*;
