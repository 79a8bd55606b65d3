//! 请求体提取器
//!
//! 在进入业务层之前校验 JSON 请求体，格式错误统一转换为 400。

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use super::error::CoreError;

const DEFAULT_REASON: &str = "Invalid input data";

/// JSON 字段期望的类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonKind {
    String,
    Number,
}

impl JsonKind {
    /// 把标量转换成期望的类型，无法转换时返回 `None`
    fn coerce(&self, value: &Value) -> Option<Value> {
        match (self, value) {
            (_, Value::Null) => Some(Value::Null),
            (JsonKind::String, Value::String(_)) => Some(value.clone()),
            (JsonKind::String, Value::Number(n)) => Some(Value::String(n.to_string())),
            (JsonKind::String, Value::Bool(b)) => Some(Value::String(b.to_string())),
            (JsonKind::Number, Value::Number(_)) => Some(value.clone()),
            (JsonKind::Number, Value::String(s)) if s.trim().is_empty() => Some(Value::Null),
            (JsonKind::Number, Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number),
            _ => None,
        }
    }
}

/// 声明请求体各字段的 JSON 类型，用于生成按字段的错误提示
pub trait JsonFields {
    fn json_fields() -> Vec<(&'static str, JsonKind)>;
}

/// 带字段格式校验的 JSON 提取器
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + JsonFields,
    S: Send + Sync,
{
    type Rejection = CoreError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(mut value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| {
                warn!("Rejected request body: {}", rejection.body_text());
                CoreError::InvalidInput(rejection_reason(&rejection))
            })?;

        coerce_fields::<T>(&mut value)?;

        serde_json::from_value(value)
            .map(ValidatedJson)
            .map_err(|e| {
                warn!("Request body does not match target type: {}", e);
                CoreError::InvalidInput(e.to_string())
            })
    }
}

fn rejection_reason(rejection: &JsonRejection) -> String {
    match rejection {
        JsonRejection::JsonSyntaxError(_) => rejection.body_text(),
        _ => DEFAULT_REASON.to_string(),
    }
}

/// 把已知字段转换成声明的 JSON 类型，`null` 视为缺省
///
/// 数字字符串可作为数字，数字和布尔值可作为字符串；对象、数组等无法转换的值报错。
pub fn coerce_fields<T: JsonFields>(value: &mut Value) -> Result<(), CoreError> {
    let object = value
        .as_object_mut()
        .ok_or_else(|| CoreError::InvalidInput(DEFAULT_REASON.to_string()))?;

    for (name, kind) in T::json_fields() {
        let Some(field) = object.get_mut(name) else {
            continue;
        };
        *field = kind.coerce(field).ok_or_else(|| {
            CoreError::InvalidInput(format!(
                "{} need to adhere to specific format. Provide valid {}",
                name, name
            ))
        })?;
    }
    Ok(())
}
