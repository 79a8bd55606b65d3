//! 应用层

pub mod products;

use axum::{middleware, Router};
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::core::middleware::{handle_panic, request_logging_middleware};
use crate::infrastructure::table::TableFile;
use products::{handler::AppState, service::ProductService};

/// 组装完整的路由及中间件
pub fn router(table: TableFile) -> Router {
    let state = AppState {
        product_service: ProductService::new(table),
    };

    products::routes(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(middleware::from_fn(request_logging_middleware))
            .layer(CatchPanicLayer::custom(handle_panic)),
    )
}
