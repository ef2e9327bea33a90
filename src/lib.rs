//! Fluffy - 文件/文本上传服务
//!
//! 基于 Actix Web 构建的无会话上传服务：上传的文件交给可配置的存储后端保存，
//! 文件详情被编码进重定向链接中，详情页无需服务端状态即可渲染。
//!
//! # 架构
//! - `config`: 配置管理
//! - `errors`: 统一错误处理
//! - `middlewares`: 速率限制中间件
//! - `models`: 数据模型定义
//! - `routes`: HTTP 路由层
//! - `runtime`: 运行时生命周期管理
//! - `services`: 业务逻辑层
//! - `storage`: 存储后端（本地文件 / S3）
//! - `utils`: 工具函数（详情编码、文件名处理、模板渲染）

pub mod config;
pub mod errors;
pub mod middlewares;
pub mod models;
pub mod routes;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod utils;
