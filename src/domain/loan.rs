// ==========================================
// 图书馆借阅系统 - 借阅领域模型
// ==========================================
// 职责: 借阅单 (Loan) 与状态变更历史 (LoanStatusHistoryEntry)
// 红线: Loan 只能经由状态机变更,永不删除
// 红线: 历史记录只追加,不修改不删除
// ==========================================

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::types::LoanStatus;

// ==========================================
// Loan - 借阅单
// ==========================================
// 对齐: loans 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    // ===== 主键 =====
    pub id: String,

    // ===== 关联 =====
    pub member_id: String, // 借阅会员
    pub book_id: String,   // 图书
    pub branch_id: String, // 分馆

    // ===== 时间 =====
    pub borrow_date: DateTime<Utc>,         // 申请/借阅日期
    pub due_date: DateTime<Utc>,            // 应还日期 (创建时 + 借期)
    pub return_date: Option<DateTime<Utc>>, // 实际归还时间

    // ===== 状态 =====
    pub status: LoanStatus,
    pub late_fee_amount: f64,  // 滞纳金（非负）
    pub notes: Option<String>, // 最近一次变更备注（覆盖写）

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Loan {
    /// 创建新的借阅申请 (REQUESTED)
    ///
    /// # 参数
    /// - `member_id`: 会员ID
    /// - `book_id`: 图书ID
    /// - `branch_id`: 分馆ID
    /// - `now`: 当前时间
    /// - `loan_period_days`: 借期天数
    ///
    /// # 返回
    /// - None: 应还日期超出可表示的时间范围
    pub fn new_request(
        member_id: &str,
        book_id: &str,
        branch_id: &str,
        now: DateTime<Utc>,
        loan_period_days: i64,
    ) -> Option<Self> {
        let due_date = now.checked_add_signed(Duration::try_days(loan_period_days)?)?;

        Some(Self {
            id: uuid::Uuid::new_v4().to_string(),
            member_id: member_id.to_string(),
            book_id: book_id.to_string(),
            branch_id: branch_id.to_string(),
            borrow_date: now,
            due_date,
            return_date: None,
            status: LoanStatus::Requested,
            late_fee_amount: 0.0,
            notes: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.member_id == user_id
    }
}

// ==========================================
// LoanStatusHistoryEntry - 状态变更历史
// ==========================================
// old_status 为 None: 创建事件
// changed_by 为 None: 系统自动变更（如逾期扫描）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanStatusHistoryEntry {
    pub id: String,
    pub loan_id: String,
    pub old_status: Option<LoanStatus>,
    pub new_status: LoanStatus,
    pub changed_by: Option<String>,
    pub changed_at: DateTime<Utc>,
    pub note: Option<String>,
}

impl LoanStatusHistoryEntry {
    pub fn new(
        loan_id: &str,
        old_status: Option<LoanStatus>,
        new_status: LoanStatus,
        changed_by: Option<String>,
        changed_at: DateTime<Utc>,
        note: Option<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            loan_id: loan_id.to_string(),
            old_status,
            new_status,
            changed_by,
            changed_at,
            note,
        }
    }

    /// 是否为系统自动变更
    pub fn is_system_change(&self) -> bool {
        self.changed_by.is_none()
    }
}

// ==========================================
// LoanWithHistory - 借阅详情（含历史）
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanWithHistory {
    #[serde(flatten)]
    pub loan: Loan,
    pub status_history: Vec<LoanStatusHistoryEntry>,
}
