//! Config HTTP service and the state it shares with the render loop.

pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResponse};
pub use routes::{bind, create_router, serve};
pub use state::{AppState, DashboardState, SharedDashboard};
