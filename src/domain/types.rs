// ==========================================
// 图书馆借阅系统 - 领域类型定义
// ==========================================
// 职责: 借阅状态、用户角色等枚举
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 借阅状态 (Loan Status)
// ==========================================
// 终态: RETURNED / LOST / CANCELED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoanStatus {
    Requested, // 已申请
    Approved,  // 已批准
    Borrowed,  // 已借出
    Overdue,   // 已逾期
    Returned,  // 已归还
    Lost,      // 已丢失
    Canceled,  // 已取消
}

/// 活跃状态集合（计入会员借阅上限）
pub const ACTIVE_STATUSES: [LoanStatus; 4] = [
    LoanStatus::Requested,
    LoanStatus::Approved,
    LoanStatus::Borrowed,
    LoanStatus::Overdue,
];

impl LoanStatus {
    /// 全部状态（用于遍历/测试）
    pub const ALL: [LoanStatus; 7] = [
        LoanStatus::Requested,
        LoanStatus::Approved,
        LoanStatus::Borrowed,
        LoanStatus::Overdue,
        LoanStatus::Returned,
        LoanStatus::Lost,
        LoanStatus::Canceled,
    ];

    /// 是否为终态
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LoanStatus::Returned | LoanStatus::Lost | LoanStatus::Canceled
        )
    }

    /// 是否为活跃状态
    pub fn is_active(&self) -> bool {
        ACTIVE_STATUSES.contains(self)
    }

    /// 转换为数据库存储字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            LoanStatus::Requested => "REQUESTED",
            LoanStatus::Approved => "APPROVED",
            LoanStatus::Borrowed => "BORROWED",
            LoanStatus::Overdue => "OVERDUE",
            LoanStatus::Returned => "RETURNED",
            LoanStatus::Lost => "LOST",
            LoanStatus::Canceled => "CANCELED",
        }
    }

    /// 从字符串解析（大小写不敏感）
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "REQUESTED" => Some(LoanStatus::Requested),
            "APPROVED" => Some(LoanStatus::Approved),
            "BORROWED" => Some(LoanStatus::Borrowed),
            "OVERDUE" => Some(LoanStatus::Overdue),
            "RETURNED" => Some(LoanStatus::Returned),
            "LOST" => Some(LoanStatus::Lost),
            "CANCELED" => Some(LoanStatus::Canceled),
            _ => None,
        }
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}

// ==========================================
// 用户角色 (User Role)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Member,    // 会员
    Librarian, // 馆员
    Admin,     // 管理员
}

impl UserRole {
    /// 转换为数据库存储字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            UserRole::Member => "MEMBER",
            UserRole::Librarian => "LIBRARIAN",
            UserRole::Admin => "ADMIN",
        }
    }

    /// 从字符串解析（大小写不敏感）
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "MEMBER" => Some(UserRole::Member),
            "LIBRARIAN" => Some(UserRole::Librarian),
            "ADMIN" => Some(UserRole::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loan_status_db_roundtrip() {
        for status in LoanStatus::ALL {
            assert_eq!(LoanStatus::parse(status.to_db_str()), Some(status));
        }
        assert_eq!(LoanStatus::parse("borrowed"), Some(LoanStatus::Borrowed));
        assert_eq!(LoanStatus::parse("UNKNOWN"), None);
    }

    #[test]
    fn test_terminal_and_active_are_disjoint() {
        for status in LoanStatus::ALL {
            assert!(!(status.is_terminal() && status.is_active()), "{}", status);
            assert!(status.is_terminal() || status.is_active(), "{}", status);
        }
    }

    #[test]
    fn test_serde_uses_screaming_snake_case() {
        let json = serde_json::to_string(&LoanStatus::Overdue).unwrap();
        assert_eq!(json, "\"OVERDUE\"");
        let role: UserRole = serde_json::from_str("\"LIBRARIAN\"").unwrap();
        assert_eq!(role, UserRole::Librarian);
    }
}
