use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::authorize::authorize;
use super::handlers::check_elevated::check_elevated;
use super::handlers::check_identity::check_identity;
use super::handlers::elevate_identity::elevate_identity;
use super::handlers::login::login;
use super::handlers::logout::logout;
use super::handlers::refresh::refresh;
use super::handlers::register::register;
use super::middleware::require_bearer;
use super::middleware::require_elevated;
use super::middleware::require_internal_caller;
use crate::domain::rotation::ports::AuthServicePort;

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthServicePort>,
    pub internal_api_key: Arc<str>,
}

pub fn create_router(auth_service: Arc<dyn AuthServicePort>, internal_api_key: &str) -> Router {
    let state = AppState {
        auth_service,
        internal_api_key: Arc::from(internal_api_key),
    };

    let public_routes = Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/refresh", post(refresh));

    let bearer_routes = Router::new()
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/identity", get(check_identity))
        .route("/api/auth/elevated", get(check_elevated))
        .route_layer(middleware::from_fn(require_bearer));

    let internal_routes = Router::new()
        .route("/api/internal/authorize", post(authorize))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_internal_caller,
        ));

    let admin_routes = Router::new()
        .route("/api/admin/identities/:login/elevate", post(elevate_identity))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_elevated,
        ));

    // Headers are left out of the span: they carry bearer tokens and the internal API key.
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(bearer_routes)
        .merge(internal_routes)
        .merge(admin_routes)
        .layer(
            ServiceBuilder::new()
                .layer(trace_layer)
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
