//! 核心响应处理模块

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

/// 写操作成功响应
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
    pub status: String,
}

impl MessageResponse {
    pub fn created(sku: &str) -> Self {
        Self::ok(format!("Successfully Created product for SKU: {}", sku))
    }

    pub fn updated(sku: &str) -> Self {
        Self::ok(format!("Successfully Updated product for SKU: {}", sku))
    }

    fn ok(message: String) -> Self {
        Self {
            message,
            status: StatusCode::OK.as_u16().to_string(),
        }
    }
}
