pub mod client;
pub mod error;
pub mod resource;
pub mod state;

pub use client::{with_query, BackendClient, HealthProbe};
pub use error::BackendError;
pub use resource::{item_path, scoped_path, segment, Resource};
pub use state::AppState;
