pub mod handler;
pub mod routes;

pub use routes::{dashboard_routes, page_routes};
