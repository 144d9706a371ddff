pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;

use axum::{
    handler::Handler,
    middleware::from_fn_with_state,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::{PasswordHashing, TokenService};
use crate::config::{AppConfig, ConfigError};
use crate::database::Store;
use crate::middleware::{authorize, Gate, GateState};
use crate::services::{CalendarService, CredentialService};

/// Everything a handler can reach. Built once at startup and cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub tokens: TokenService,
    pub credentials: CredentialService,
    pub calendar: CalendarService,
}

impl AppState {
    pub fn new(config: &AppConfig, store: Arc<dyn Store>) -> Result<Self, ConfigError> {
        let hashing = PasswordHashing::new(
            config.security.password_hash_iterations,
            config.security.password_hash_memory_kib,
        )?;

        Ok(Self {
            tokens: TokenService::new(&config.security)?,
            credentials: CredentialService::new(store.clone(), hashing),
            calendar: CalendarService::new(store.clone()),
            store,
        })
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/ping", get(handlers::general::ping))
        .route("/admin/ping", get(handlers::general::ping))
        .merge(auth_routes(&state))
        .merge(user_routes())
        .merge(job_routes(&state))
        .merge(expense_routes(&state))
        .merge(event_routes(&state))
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_routes(state: &AppState) -> Router<AppState> {
    use axum::routing::post;
    use handlers::auth;

    let user_gate = from_fn_with_state(GateState::new(state, Gate::USER), authorize);
    let subject_gate = from_fn_with_state(GateState::new(state, Gate::SUBJECT), authorize);

    Router::new()
        .route("/admin/register", post(auth::register))
        .route("/admin/login", post(auth::login))
        .route("/admin/logout", get(auth::logout.layer(user_gate)))
        .route("/admin/status", get(auth::status.layer(subject_gate)))
}

fn user_routes() -> Router<AppState> {
    use handlers::users;

    Router::new()
        .route("/admin/users", get(users::list).post(users::create))
        .route("/admin/users/:id", get(users::get))
}

fn job_routes(state: &AppState) -> Router<AppState> {
    use handlers::jobs;

    let user_gate = from_fn_with_state(GateState::new(state, Gate::USER), authorize);

    Router::new()
        .route(
            "/admin/jobs",
            get(jobs::list).post(jobs::create.layer(user_gate.clone())),
        )
        .route(
            "/admin/jobs/:id",
            get(jobs::get)
                .post(jobs::update.layer(user_gate.clone()))
                .delete(jobs::delete.layer(user_gate)),
        )
}

fn expense_routes(state: &AppState) -> Router<AppState> {
    use handlers::expenses::{one_time, recurring};

    let user_gate = from_fn_with_state(GateState::new(state, Gate::USER), authorize);

    Router::new()
        // One-time expenses
        .route(
            "/admin/one-time-expenses",
            get(one_time::list).post(one_time::create),
        )
        .route(
            "/admin/one-time-expenses/:id",
            get(one_time::get)
                .post(one_time::update.layer(user_gate.clone()))
                .delete(one_time::delete.layer(user_gate.clone())),
        )
        // Recurring expenses
        .route(
            "/admin/recurring-expenses",
            get(recurring::list).post(recurring::create),
        )
        .route(
            "/admin/recurring-expenses/:id",
            get(recurring::get)
                .post(recurring::update.layer(user_gate.clone()))
                .delete(recurring::delete.layer(user_gate)),
        )
}

fn event_routes(state: &AppState) -> Router<AppState> {
    use handlers::events;

    let admin_gate = from_fn_with_state(GateState::new(state, Gate::ADMIN), authorize);

    Router::new().route("/admin/events", get(events::list.layer(admin_gate)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    fn router() -> Router {
        let state = AppState::new(&AppConfig::testing(), Arc::new(MemoryStore::new())).unwrap();
        app(state)
    }

    async fn call(uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn both_ping_routes_answer() {
        for uri in ["/ping", "/admin/ping"] {
            let (status, body) = call(uri).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["message"], "pong!");
        }
    }

    #[tokio::test]
    async fn gated_routes_demand_a_token() {
        for uri in ["/admin/logout", "/admin/status", "/admin/events"] {
            let (status, body) = call(uri).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", uri);
            assert_eq!(body["code"], "TOKEN_MISSING");
        }
    }

    #[tokio::test]
    async fn open_reads_start_empty() {
        let (status, body) = call("/admin/jobs").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["data"]["jobs"].as_array().unwrap().is_empty());

        let (_, body) = call("/admin/users").await;
        assert!(body["data"]["users"].as_array().unwrap().is_empty());
    }
}
