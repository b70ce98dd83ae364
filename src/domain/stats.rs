// ==========================================
// 图书馆借阅系统 - 系统统计读模型
// ==========================================

use serde::{Deserialize, Serialize};

/// 全局统计（管理员）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemStats {
    // ===== 用户 =====
    pub total_users: i64,
    pub total_members: i64,
    pub total_librarians: i64,
    pub total_admins: i64,

    // ===== 分馆 =====
    pub total_branches: i64,
    pub active_branches: i64,

    // ===== 图书 / 库存 =====
    pub total_books: i64,
    pub total_book_copies: i64,
    pub total_available_copies: i64,

    // ===== 借阅 =====
    pub total_loans: i64,
    pub active_loans: i64,
    pub overdue_loans: i64,
    pub loans_last_30_days: i64,
}
