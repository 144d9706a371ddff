use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Map, Value};

/// Success envelope: `{"status": "success", ...}` plus whatever fields the
/// handler attaches (`message`, `data`, `user`, ...).
#[derive(Debug)]
pub struct ApiResponse {
    status_code: StatusCode,
    body: Map<String, Value>,
    serialization_error: Option<serde_json::Error>,
}

impl ApiResponse {
    /// Create a successful API response with default 200 status
    pub fn success() -> Self {
        Self::with_status(StatusCode::OK)
    }

    /// Create a 201 Created response
    pub fn created() -> Self {
        Self::with_status(StatusCode::CREATED)
    }

    pub fn with_status(status_code: StatusCode) -> Self {
        let mut body = Map::new();
        body.insert("status".to_string(), Value::from("success"));
        Self {
            status_code,
            body,
            serialization_error: None,
        }
    }

    pub fn message(self, message: impl Into<String>) -> Self {
        self.field("message", message.into())
    }

    pub fn data(self, data: impl Serialize) -> Self {
        self.field("data", data)
    }

    /// Attach an arbitrary top-level field
    pub fn field(mut self, key: &str, value: impl Serialize) -> Self {
        match serde_json::to_value(value) {
            Ok(value) => {
                self.body.insert(key.to_string(), value);
            }
            Err(e) => {
                self.serialization_error.get_or_insert(e);
            }
        }
        self
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        if let Some(e) = self.serialization_error {
            tracing::error!("Failed to serialize response data: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "status": "fail",
                    "message": "Failed to serialize response data"
                })),
            )
                .into_response();
        }

        (self.status_code, Json(Value::Object(self.body))).into_response()
    }
}

pub type ApiResult = Result<ApiResponse, crate::error::ApiError>;
