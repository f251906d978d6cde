mod handlers;
mod response;
mod server;

pub use response::{
    ApiError, DetectResponse, ErrorResponse, HealthResponse, ResetResponse, StatusResponse,
};
pub use server::{router, ApiServer, ServerState};
