//! Routes 模块
//!
//! 定义 API 路由。

pub mod kg_routes;
pub mod memory_routes;
