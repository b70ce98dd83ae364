// ==========================================
// 图书馆借阅系统 - 馆藏领域模型
// ==========================================
// 职责: 分馆 (LibraryBranch) 与图书 (Book)
// 红线: 0 <= available_copies <= total_copies
// 红线: available_copies 只能由借阅状态机修改
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// LibraryBranch - 分馆
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryBranch {
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LibraryBranch {
    pub fn new(name: &str) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            address: None,
            phone_number: None,
            email: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

// ==========================================
// Book - 图书（含库存台账字段）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    // ===== 主键 =====
    pub id: String,

    // ===== 书目信息 =====
    pub title: String,
    pub author: Option<String>,
    pub isbn: String,
    pub genre: Option<String>,
    pub publication_year: Option<i32>,

    // ===== 库存台账 =====
    pub total_copies: i64,     // 总副本数
    pub available_copies: i64, // 可借副本数

    // ===== 归属 =====
    pub branch_id: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// 新建图书，初始时全部副本可借
    pub fn new(title: &str, isbn: &str, branch_id: &str, total_copies: i64) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.to_string(),
            author: None,
            isbn: isbn.to_string(),
            genre: None,
            publication_year: None,
            total_copies,
            available_copies: total_copies,
            branch_id: branch_id.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    /// 台账是否满足不变式
    pub fn ledger_is_consistent(&self) -> bool {
        0 <= self.available_copies && self.available_copies <= self.total_copies
    }
}
