pub mod auth;
pub mod payload;
pub mod response;

pub use auth::{authorize, AuthUser, Gate, GateState};
pub use payload::Payload;
pub use response::{ApiResponse, ApiResult};
