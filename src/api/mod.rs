//! HTTP API module for the payroll calculation engine.
//!
//! This module exposes each calculator as a stateless JSON endpoint. It does
//! no authentication, persistence or rendering.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{AvosRequest, EmployerCostRequest, FgtsRequest, InssRequest, IrrfRequest};
pub use response::ApiError;
pub use state::AppState;
