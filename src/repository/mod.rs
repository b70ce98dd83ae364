// ==========================================
// 图书馆借阅系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod book_repo;
pub mod branch_repo;
pub mod error;
pub mod loan_history_repo;
pub mod loan_repo;
pub mod sql_types;
pub mod stats_repo;
pub mod user_repo;

// 重导出核心仓储
pub use book_repo::BookRepository;
pub use branch_repo::BranchRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use loan_history_repo::LoanHistoryRepository;
pub use loan_repo::{LoanQuery, LoanRepository};
pub use stats_repo::StatsRepository;
pub use user_repo::UserRepository;
