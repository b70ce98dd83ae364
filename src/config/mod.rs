// ==========================================
// 图书馆借阅系统 - 配置层
// ==========================================
// 职责: 借阅策略配置管理
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod lending_config_trait;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use lending_config_trait::{LendingConfigReader, LendingPolicy};
