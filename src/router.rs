use crate::controller::{document_controller, health_check_controller};
use crate::AppState;
use axum::{
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use sse::serve_changes;

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(document_routes(app_state))
        .merge(health_routes())
}

fn document_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/documents", post(document_controller::create))
        .route("/documents/:id", put(document_controller::update))
        .merge(
            // GET /documents, answered as a change poll for event stream clients
            Router::new()
                .route("/documents", get(document_controller::index))
                .route_layer(from_fn_with_state(
                    app_state.change_stream.clone(),
                    serve_changes,
                )),
        )
        .with_state(app_state)
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}
