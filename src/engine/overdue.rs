// ==========================================
// 图书馆借阅系统 - 逾期扫描规则
// ==========================================
// 职责: 逾期候选判定 + 扫描结果汇总
// 说明: 实际的逐笔状态变更由 LoanApi 在独立事务中完成
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::loan::Loan;
use crate::domain::types::LoanStatus;

/// 系统自动逾期时写入的备注
pub const SYSTEM_OVERDUE_NOTE: &str = "Automatic overdue sweep";

/// 是否为逾期候选: BORROWED 且应还日期（UTC 日期）早于今天
pub fn is_overdue_candidate(loan: &Loan, today: NaiveDate) -> bool {
    loan.status == LoanStatus::Borrowed && loan.due_date.date_naive() < today
}

/// 从借阅列表中筛选逾期候选ID
pub fn select_candidates(loans: &[Loan], today: NaiveDate) -> Vec<String> {
    loans
        .iter()
        .filter(|loan| is_overdue_candidate(loan, today))
        .map(|loan| loan.id.clone())
        .collect()
}

// ==========================================
// OverdueSweepReport - 扫描结果
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverdueSweepReport {
    pub scanned_count: usize,     // 候选数量
    pub updated_count: usize,     // 成功转为 OVERDUE 的数量
    pub skipped_count: usize,     // 已被并发变更、跳过的数量
    pub failed_loan_ids: Vec<String>, // 单笔失败（已跳过）
}

impl OverdueSweepReport {
    pub fn record_updated(&mut self) {
        self.updated_count += 1;
    }

    pub fn record_skipped(&mut self) {
        self.skipped_count += 1;
    }

    pub fn record_failed(&mut self, loan_id: &str) {
        self.failed_loan_ids.push(loan_id.to_string());
    }
}
