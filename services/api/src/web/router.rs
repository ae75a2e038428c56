//! services/api/src/web/router.rs
//!
//! Assembles the HTTP surface: public routes, bearer-protected routes, the
//! static uploads directory and the Swagger UI.

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::adapters::files::UPLOADS_ROUTE;
use crate::config::ConfigError;
use crate::error::ApiError;
use crate::web::{
    auth::{login_handler, register_handler},
    catalog::{featured_catalog_handler, search_catalog_handler},
    middleware::require_auth,
    rest::{get_book_handler, list_books_handler, upload_book_handler, ApiDoc},
    state::AppState,
};

pub fn build_router(app_state: Arc<AppState>) -> Result<Router, ApiError> {
    let config = app_state.config.clone();

    let origin = config.cors_origin.parse::<HeaderValue>().map_err(|e| {
        ApiError::Config(ConfigError::InvalidValue(
            "CORS_ORIGIN".to_string(),
            e.to_string(),
        ))
    })?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/api/auth/register", post(register_handler))
        .route("/api/auth/login", post(login_handler))
        .route("/api/catalog/search", get(search_catalog_handler))
        .route("/api/catalog/featured", get(featured_catalog_handler));

    // Protected routes (bearer token required)
    let protected_routes = Router::new()
        .route("/api/books", get(list_books_handler))
        .route("/api/books/upload", post(upload_book_handler))
        .route("/api/books/{id}", get(get_book_handler))
        .route_layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(app_state);

    let app = Router::new()
        .merge(api_router)
        .nest_service(
            &format!("/{}", UPLOADS_ROUTE),
            ServeDir::new(&config.upload_dir),
        )
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    Ok(app)
}
