//! Request middleware

use crate::error::{render_error, ErrorExtension};
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Re-render error responses without details when running in production.
pub async fn error_details_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;
    if !state.config.is_production() {
        return response;
    }

    match response.extensions().get::<ErrorExtension>() {
        Some(ErrorExtension(error)) => {
            let error = error.clone();
            render_error(&error, true)
        }
        None => response,
    }
}
