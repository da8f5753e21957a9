pub mod errors;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod response;
pub mod router;

pub use router::{create_router, AppState};
