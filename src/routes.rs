use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::session::{fetch_access_token, require_access_token, signout};
use crate::shared::AppState;
use crate::todo::{
    assign_todo, check_todo, create_todo, delete_todo, get_todo, list_todos, uncheck_todo,
    update_todo_title,
};
use crate::user::{get_current_user, signin, signup};

pub async fn hello() -> &'static str {
    "Hello, World!"
}

/// Builds the full `/api` router. Everything except hello, signup, signin and
/// the refresh endpoint sits behind the access token gate.
pub fn build_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/api/hello", get(hello))
        .route("/api/user/signup", post(signup))
        .route("/api/user/signin", post(signin))
        .route("/api/user/fetch-access-token", get(fetch_access_token));

    let protected = Router::new()
        .route("/api/user/signout", post(signout))
        .route("/api/user/user", get(get_current_user))
        .route("/api/todo/create", post(create_todo))
        .route("/api/todo", get(list_todos))
        .route("/api/todo/", get(list_todos))
        .route(
            "/api/todo/:todo_id",
            get(get_todo).delete(delete_todo).patch(update_todo_title),
        )
        .route("/api/todo/:todo_id/check", patch(check_todo))
        .route("/api/todo/:todo_id/uncheck", patch(uncheck_todo))
        .route("/api/todo/:todo_id/assign", patch(assign_todo))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_access_token,
        ));

    public
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
