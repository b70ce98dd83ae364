// ==========================================
// 图书馆借阅系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod book;
pub mod loan;
pub mod stats;
pub mod types;
pub mod user;

// 重导出核心类型
pub use book::{Book, LibraryBranch};
pub use loan::{Loan, LoanStatusHistoryEntry, LoanWithHistory};
pub use stats::SystemStats;
pub use types::{LoanStatus, UserRole, ACTIVE_STATUSES};
pub use user::{Actor, User};
