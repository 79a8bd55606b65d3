//! 产品目录应用

pub mod handler;
pub mod model;
pub mod service;

use axum::{
    routing::{get, post, put},
    Router,
};

use handler::AppState;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/products/view", get(handler::list_products))
        .route("/products/create", post(handler::create_product))
        .route("/products/update", put(handler::update_product))
        .with_state(state)
}
