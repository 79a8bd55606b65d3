//! 核心错误处理模块

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// 产品存储操作类型，决定错误提示文案
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Fetch,
    Create,
    Update,
}

/// 核心错误类型
///
/// 底层错误（IO、CSV、数字解析）在转换点记录日志，不会越过核心边界，
/// 对外只暴露状态码、错误标签和固定原因。
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoreError {
    #[error("source not found")]
    SourceUnavailable,
    #[error("column mapping failed")]
    MappingFailure,
    #[error("malformed data during {0:?}")]
    MalformedData(Operation),
    #[error("duplicate sku {sku}")]
    KeyConflict { sku: String },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("internal failure during {0:?}")]
    InternalFailure(Operation),
}

impl CoreError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            CoreError::SourceUnavailable => StatusCode::NOT_FOUND,
            CoreError::MappingFailure | CoreError::InternalFailure(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            CoreError::MalformedData(_)
            | CoreError::KeyConflict { .. }
            | CoreError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// 简短错误标签
    pub fn error_label(&self) -> &'static str {
        match self {
            CoreError::SourceUnavailable => "Source not found",
            CoreError::MappingFailure => "Failed to map header",
            CoreError::MalformedData(_) => "Invalid Data",
            CoreError::KeyConflict { .. } => "Duplicate Product",
            CoreError::InvalidInput(_) => "Invalid Request",
            CoreError::InternalFailure(Operation::Fetch) => "Failed to get data",
            CoreError::InternalFailure(Operation::Create) => "Failed to create data",
            CoreError::InternalFailure(Operation::Update) => "Failed to update data",
        }
    }

    /// 面向调用方的原因描述
    pub fn reason(&self) -> String {
        match self {
            CoreError::SourceUnavailable => {
                "Failed to fetch source file from given path.".to_string()
            }
            CoreError::MappingFailure => "Unable to map header to store product".to_string(),
            CoreError::MalformedData(Operation::Update) => {
                "Failed to update invalid product details.".to_string()
            }
            CoreError::MalformedData(_) => "Failed to create invalid product details.".to_string(),
            CoreError::KeyConflict { sku } => format!(
                "Product with sku id: {} already exists. Please add product with different SKU",
                sku
            ),
            CoreError::InvalidInput(reason) => reason.clone(),
            CoreError::InternalFailure(Operation::Fetch) => {
                "Unable to retrieve data from csv.".to_string()
            }
            CoreError::InternalFailure(Operation::Create) => {
                "Unable to add new product to csv.".to_string()
            }
            CoreError::InternalFailure(Operation::Update) => {
                "Unable to update data to csv.".to_string()
            }
        }
    }
}

/// 统一错误响应结构
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub timestamp: String,
    pub status: u16,
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            status: status.as_u16(),
            error: error.into(),
            message: message.into(),
        }
    }
}

impl From<&CoreError> for ErrorResponse {
    fn from(err: &CoreError) -> Self {
        ErrorResponse::new(err.status_code(), err.error_label(), err.reason())
    }
}

impl IntoResponse for CoreError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(ErrorResponse::from(&self))).into_response()
    }
}
