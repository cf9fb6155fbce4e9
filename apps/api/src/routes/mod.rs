pub mod health;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

use crate::auth;
use crate::documents;
use crate::resumes;
use crate::state::AppState;
use crate::versions;

pub fn build_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/auth/register", post(auth::handlers::handle_register))
        .route("/api/v1/auth/verify", get(auth::handlers::handle_verify))
        .route("/api/v1/auth/login", post(auth::handlers::handle_login))
        .route("/api/v1/auth/logout", post(auth::handlers::handle_logout));

    let protected = Router::new()
        .route("/api/v1/auth/me", get(auth::handlers::handle_me))
        .route(
            "/api/v1/documents",
            get(documents::handlers::handle_list).post(documents::handlers::handle_upload),
        )
        .route(
            "/api/v1/documents/:id",
            delete(documents::handlers::handle_delete),
        )
        .route(
            "/api/v1/documents/:id/download",
            get(documents::handlers::handle_download),
        )
        .route(
            "/api/v1/resume",
            get(resumes::handlers::handle_get_active)
                .post(resumes::handlers::handle_create)
                .patch(resumes::handlers::handle_update),
        )
        .route(
            "/api/v1/resume/versions",
            get(versions::handlers::handle_list).post(versions::handlers::handle_create),
        )
        .route(
            "/api/v1/resume/versions/:v/download",
            get(versions::handlers::handle_download),
        )
        .route(
            "/api/v1/resume/versions/:v/generate",
            post(versions::handlers::handle_generate),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::require_auth,
        ));

    public.merge(protected).with_state(state)
}
