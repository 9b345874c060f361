//! Quran Portal - 家长短信通知服务
//!
//! 为古兰经学习班发送课程结果、考勤与作业短信。
//!
//! # 架构
//! - `cache`: 缓存层（Moka/Redis）
//! - `config`: 配置管理
//! - `entity`: SeaORM 数据库实体
//! - `errors`: 统一错误处理
//! - `middlewares`: 限流中间件
//! - `models`: 数据模型定义
//! - `notify`: 收件人解析、模板渲染与批量发送
//! - `routes`: API 路由层
//! - `runtime`: 运行时生命周期管理
//! - `services`: 业务逻辑层
//! - `sms`: 短信服务商
//! - `storage`: 数据存储层（SeaORM）
//! - `utils`: 工具函数

pub mod cache;
pub mod config;
pub mod entity;
pub mod errors;
pub mod middlewares;
pub mod models;
pub mod notify;
pub mod routes;
pub mod runtime;
pub mod services;
pub mod sms;
pub mod storage;
pub mod utils;
