//! Member API 模块

mod handler;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/members", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/dashboard", get(handler::dashboard))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route("/{id}/pay", post(handler::pay))
        .route(
            "/{id}/payment-history/{index}",
            put(handler::adjust_payment).delete(handler::delete_payment),
        )
        .route("/{id}/adjustments", post(handler::manual_adjustment))
        .route("/{id}/status", put(handler::change_status))
        .route("/{id}/restart", post(handler::restart))
        .route("/{id}/extend", post(handler::extend))
}
