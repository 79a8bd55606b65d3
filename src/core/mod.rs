//! 核心层：错误、响应、中间件与请求提取

pub mod error;
pub mod extract;
pub mod middleware;
pub mod response;
