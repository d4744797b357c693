//! Clinic portal API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! All routes live at the root: the portal frontend calls them directly.
//!
//! Every request passes through actor resolution, which turns a bearer
//! token into an `Option<Actor>` extension without ever rejecting; each
//! handler decides for itself how much identity it needs.

use std::sync::Arc;
use std::time::Duration;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::state::ClinicState;

/// Build the clinic API router.
///
/// Handlers use `State<ApiContext>`; the actor-resolution middleware
/// receives the same context via `from_fn_with_state`.
pub fn clinic_router(state: Arc<ClinicState>) -> Router {
    let ctx = ApiContext::new(state);
    build_router(ctx)
}

fn build_router(ctx: ApiContext) -> Router {
    // The portal is a browser client on another origin, so CORS must
    // admit the Authorization header and preflight OPTIONS.
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60));

    // Layers apply bottom (innermost) to top (outermost):
    //   CORS → actor resolution → handler
    //
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/unread-counts", get(endpoints::notifications::unread_counts))
        .route("/my-chat/unread", get(endpoints::notifications::my_chat_unread))
        .route(
            "/operator-chat/unread",
            get(endpoints::notifications::operator_chat_unread),
        )
        .route("/my-chat/messages", post(endpoints::chat::post_my_message))
        .route("/my-chat/open", post(endpoints::chat::open_my_chat))
        .route("/chats/:id/messages", post(endpoints::chat::post_staff_reply))
        .route("/chats/:id/open", post(endpoints::chat::open_as_staff))
        .route("/letters", post(endpoints::letters::submit))
        .route("/letters/:id/replies", post(endpoints::letters::reply))
        .route("/letters/:id/open", post(endpoints::letters::open))
        .route("/feedback", post(endpoints::feedback::submit))
        .route("/feedback/:id/seen", post(endpoints::feedback::mark_seen))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn_with_state(
            ctx,
            middleware::auth::resolve_actor,
        ))
        .layer(cors)
}
