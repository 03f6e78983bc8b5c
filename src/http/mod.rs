//! HTTP surface: router, health endpoint, static files

pub mod routes;

pub use routes::build_router;
