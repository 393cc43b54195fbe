//! Router configuration for the Web API.

use axum::{
    middleware,
    routing::{get, patch, post, put},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::AuthConfig;
use crate::store::Stores;

use super::handlers::{
    add_comment, add_member, create_board, create_card, create_list, delete_board, delete_card,
    delete_list, get_board, get_board_lists, get_boards, get_card, login, logout, me, move_card,
    move_card_to_list, move_list, register, remove_member, star_board, update_board, update_card,
    update_list, update_member_role, AppState,
};
use super::middleware::{create_cors_layer, jwt_auth, JwtState};

/// Create the main API router.
pub fn create_router(stores: Stores, auth: AuthConfig, cors_origins: &[String]) -> Router {
    let jwt_state = Arc::new(JwtState::new(&auth.jwt_secret, stores.id_kind));
    let app_state = Arc::new(AppState::new(stores, auth));

    let auth_routes = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me));

    let board_routes = Router::new()
        .route("/", get(get_boards).post(create_board))
        .route(
            "/:id",
            get(get_board).put(update_board).delete(delete_board),
        )
        .route("/:id/star", patch(star_board))
        .route("/:id/members", post(add_member))
        .route(
            "/:board_id/members/:user_id",
            put(update_member_role).delete(remove_member),
        );

    let list_routes = Router::new()
        .route("/board/:board_id", get(get_board_lists).post(create_list))
        .route("/:id", put(update_list).delete(delete_list))
        .route("/:id/move", patch(move_list));

    let card_routes = Router::new()
        .route("/list/:list_id", post(create_card))
        .route(
            "/:id",
            get(get_card).put(update_card).delete(delete_card),
        )
        .route("/:id/move", patch(move_card))
        .route("/:id/move-to-list", patch(move_card_to_list))
        .route("/:id/comments", post(add_comment));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/boards", board_routes)
        .nest("/lists", list_routes)
        .nest("/cards", card_routes);

    let jwt_state_for_middleware = jwt_state.clone();

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health_check))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(middleware::from_fn(move |req, next| {
                    let state = jwt_state_for_middleware.clone();
                    jwt_auth(state, req, next)
                })),
        )
        .with_state(app_state)
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}
