//! # 产品目录服务
//!
//! 以 CSV 文件为存储的产品目录 HTTP 服务：
//! - `app`: 产品路由、处理器、业务服务与数据模型
//! - `core`: 统一错误、响应、中间件与请求提取
//! - `infrastructure`: CSV 表文件读写与日志初始化
//! - `config`: TOML 配置加载

pub mod app;
pub mod config;
pub mod core;
pub mod infrastructure;

pub use app::router;
pub use config::Config;
