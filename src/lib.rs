// ==========================================
// 图书馆借阅系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite + tokio
// 系统定位: 借阅流程核心（库存台账 / 借阅状态机 / 滞纳金 / 逾期扫描）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 配置层 - 借阅策略
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 状态组装与调度
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{LoanStatus, UserRole, ACTIVE_STATUSES};

// 领域实体
pub use domain::{
    Actor, Book, LibraryBranch, Loan, LoanStatusHistoryEntry, LoanWithHistory, SystemStats, User,
};

// 引擎
pub use engine::{InventoryLedger, LoanStateMachine, OverdueSweepReport, TransitionError};

// API
pub use api::{AdminApi, ApiError, ApiResult, LoanApi, LoanFilter};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "图书馆借阅系统";
