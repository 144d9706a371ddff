// handlers/general.rs - GET /ping and GET /admin/ping

use crate::middleware::ApiResponse;

/// Liveness probe
pub async fn ping() -> ApiResponse {
    ApiResponse::success().message("pong!")
}
