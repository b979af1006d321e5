pub mod auth;
pub mod bookings;
pub mod catalog;
pub mod dto;
pub mod middleware;
pub mod rest;
pub mod reviews;
pub mod router;
pub mod state;

// Re-export what the binaries need to assemble the server.
pub use middleware::require_auth;
pub use router::build_router;
pub use state::AppState;
