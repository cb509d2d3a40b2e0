mod error;
pub mod handlers;
mod router;

pub use error::ApiError;
pub use router::build_router;
