//! Handlers 模块
//!
//! HTTP 请求处理程序。

pub mod kg_handler;
pub mod memory_handler;
