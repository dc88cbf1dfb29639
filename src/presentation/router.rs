use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::infrastructure::observability::request_id_middleware;
use crate::presentation::handlers::{
    PROCESS_BODY_LIMIT, content_stats_handler, create_user_format_handler,
    delete_content_handler, delete_user_format_handler, forgot_password_handler,
    get_content_handler, get_user_format_handler, health_handler, list_content_by_format_handler,
    list_content_handler, list_user_formats_handler, login_handler, process_content_handler,
    profile_handler, register_handler, reset_password_handler, test_email_connection_handler,
    update_content_handler, update_user_format_handler,
};
use crate::presentation::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/health", get(health_handler))
        .route("/auth/register", post(register_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/profile", get(profile_handler))
        .route("/auth/forgot-password", post(forgot_password_handler))
        .route("/auth/reset-password", post(reset_password_handler))
        .route("/email/test-connection", get(test_email_connection_handler))
        .route(
            "/user-formats",
            post(create_user_format_handler).get(list_user_formats_handler),
        )
        .route(
            "/user-formats/{id}",
            get(get_user_format_handler)
                .patch(update_user_format_handler)
                .delete(delete_user_format_handler),
        )
        .route(
            "/content-processing/process",
            post(process_content_handler).layer(DefaultBodyLimit::max(PROCESS_BODY_LIMIT)),
        )
        .route("/content-processing", get(list_content_handler))
        .route("/content-processing/stats", get(content_stats_handler))
        .route(
            "/content-processing/format/{format_id}",
            get(list_content_by_format_handler),
        )
        .route(
            "/content-processing/{id}",
            get(get_content_handler)
                .patch(update_content_handler)
                .delete(delete_content_handler),
        )
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}
