// ==========================================
// 图书馆借阅系统 - 应用层
// ==========================================
// 职责: 组装共享状态、后台调度
// ==========================================

pub mod scheduler;
pub mod state;

// 重导出
pub use scheduler::OverdueScheduler;
pub use state::{get_default_db_path, AppState};
