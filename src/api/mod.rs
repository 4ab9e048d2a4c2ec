//! API Module
//!
//! HTTP handlers and routing for the cache administration REST API.
//!
//! # Endpoints
//! - `PUT /entries/:key?region=` - Add a value unless one exists
//! - `GET /entries/:key?region=` - Retrieve a value
//! - `DELETE /entries/:key?region=` - Remove a value
//! - `DELETE /regions/:region` - Clear one region
//! - `DELETE /regions` - Clear every region
//! - `GET /stats` - Sizes and counters
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
