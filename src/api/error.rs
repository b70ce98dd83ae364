// ==========================================
// 图书馆借阅系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换 Repository/Engine 错误为调用方可区分的错误
// ==========================================

use crate::domain::types::LoanStatus;
use crate::engine::transition::TransitionError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("无权限: {0}")]
    Forbidden(String),

    #[error("无效的状态转换: from={from} to={to}")]
    InvalidTransition { from: LoanStatus, to: LoanStatus },

    /// 借出时可借副本为 0
    #[error("库存不足: book_id={0}")]
    OutOfStock(String),

    /// 创建借阅时可借副本为 0
    #[error("无可借副本: book_id={0}")]
    NoAvailableCopies(String),

    #[error("在借数量已达上限: member_id={member_id}, limit={limit}")]
    LoanLimitExceeded { member_id: String, limit: i64 },

    #[error("无效输入: {0}")]
    InvalidInput(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 是否为存储层故障（区别于单笔借阅的业务错误）
    ///
    /// 逾期扫描遇到存储层故障时中止本轮，业务错误只跳过当前借阅单
    pub fn is_store_error(&self) -> bool {
        matches!(
            self,
            ApiError::DatabaseError(_)
                | ApiError::DatabaseConnectionError(_)
                | ApiError::DatabaseTransactionError(_)
        )
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::InvalidInput(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::InvalidInput(format!("外键约束违反: {}", msg))
            }
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 TransitionError 转换
// ==========================================
impl From<TransitionError> for ApiError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::Forbidden { reason } => ApiError::Forbidden(reason),
            TransitionError::InvalidTransition { from, to } => {
                ApiError::InvalidTransition { from, to }
            }
            TransitionError::OutOfStock { book_id } => ApiError::OutOfStock(book_id),
        }
    }
}

// rusqlite 事务控制（BEGIN/COMMIT）失败
impl From<rusqlite::Error> for ApiError {
    fn from(err: rusqlite::Error) -> Self {
        match RepositoryError::from(err) {
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseTransactionError(msg),
            other => ApiError::from(other),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
