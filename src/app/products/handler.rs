//! 产品处理器

use axum::{extract::State, response::Json};
use tracing::error;

use super::{model::Product, service::ProductService};
use crate::core::{
    error::{CoreError, Operation},
    extract::ValidatedJson,
    response::MessageResponse,
};

#[derive(Clone)]
pub struct AppState {
    pub product_service: ProductService,
}

/// 文件读写是阻塞操作，放到阻塞线程池中执行
async fn run_blocking<T, F>(op: Operation, task: F) -> Result<T, CoreError>
where
    F: FnOnce() -> Result<T, CoreError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task).await.map_err(|e| {
        error!("Product store task failed: {}", e);
        CoreError::InternalFailure(op)
    })?
}

pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<Product>>, CoreError> {
    let service = state.product_service;
    let products = run_blocking(Operation::Fetch, move || service.list_products()).await?;
    Ok(Json(products))
}

pub async fn create_product(
    State(state): State<AppState>,
    ValidatedJson(product): ValidatedJson<Product>,
) -> Result<Json<MessageResponse>, CoreError> {
    let service = state.product_service;
    let created = run_blocking(Operation::Create, move || service.create_product(&product)).await?;
    Ok(Json(MessageResponse::created(&created.sku)))
}

pub async fn update_product(
    State(state): State<AppState>,
    ValidatedJson(product): ValidatedJson<Product>,
) -> Result<Json<MessageResponse>, CoreError> {
    let service = state.product_service;
    let sku = product.sku.clone();
    run_blocking(Operation::Update, move || service.update_product(&product)).await?;
    Ok(Json(MessageResponse::updated(&sku)))
}
