// ==========================================
// 图书馆借阅系统 - 借阅状态机
// ==========================================
// 职责: 角色前置校验 -> 转换表 -> 副作用（台账/滞纳金/归还时间）-> 历史记录
// 输入: 当前 Loan + Book 快照
// 输出: TransitionOutcome（由 API 层在同一事务内落库）
// 红线: 不直接写库；失败时不修改输入
// ==========================================

use chrono::{DateTime, Utc};
use tracing::instrument;

use crate::domain::book::Book;
use crate::domain::loan::{Loan, LoanStatusHistoryEntry};
use crate::domain::types::LoanStatus;
use crate::domain::user::Actor;
use crate::engine::late_fee::{calculate_late_fee, LATE_FEE_PER_DAY};
use crate::engine::ledger::{InventoryLedger, LedgerEffect};
use crate::engine::transition::{check_role_capability, check_transition, TransitionError};

// ==========================================
// TransitionRequest - 状态变更请求
// ==========================================
#[derive(Debug, Clone)]
pub struct TransitionRequest<'a> {
    pub new_status: LoanStatus,
    /// None 表示系统自动变更
    pub actor: Option<&'a Actor>,
    pub note: Option<String>,
    pub now: DateTime<Utc>,
}

// ==========================================
// TransitionOutcome - 状态变更结果
// ==========================================
#[derive(Debug, Clone)]
pub struct TransitionOutcome {
    pub old_status: LoanStatus,
    pub loan: Loan,
    /// 台账有变动时为 Some，此时 book 为变动后的快照
    pub ledger_effect: Option<LedgerEffect>,
    pub book: Book,
    pub history: LoanStatusHistoryEntry,
}

// ==========================================
// LoanStateMachine
// ==========================================
#[derive(Debug, Clone)]
pub struct LoanStateMachine {
    late_fee_per_day: f64,
}

impl Default for LoanStateMachine {
    fn default() -> Self {
        Self::new(LATE_FEE_PER_DAY)
    }
}

impl LoanStateMachine {
    pub fn new(late_fee_per_day: f64) -> Self {
        Self { late_fee_per_day }
    }

    /// 台账副作用（仅由新旧状态决定）
    pub fn ledger_effect_for(old: LoanStatus, new: LoanStatus) -> Option<LedgerEffect> {
        match (old, new) {
            (LoanStatus::Approved | LoanStatus::Requested, LoanStatus::Borrowed) => {
                Some(LedgerEffect::Decrement)
            }
            (LoanStatus::Borrowed | LoanStatus::Overdue, LoanStatus::Returned) => {
                Some(LedgerEffect::Increment)
            }
            _ => None,
        }
    }

    /// 计算一次状态变更
    ///
    /// # 参数
    /// - `loan`: 当前借阅单（事务内读取的最新值）
    /// - `book`: 借阅单关联图书（事务内读取的最新值）
    /// - `request`: 目标状态、操作人、备注、当前时间
    ///
    /// # 返回
    /// - `Ok(TransitionOutcome)`: 更新后的借阅单/图书和待追加的历史记录
    /// - `Err(Forbidden | InvalidTransition | OutOfStock)`
    #[instrument(skip(self, loan, book, request), fields(loan_id = %loan.id, to = %request.new_status))]
    pub fn apply(
        &self,
        loan: &Loan,
        book: &Book,
        request: &TransitionRequest<'_>,
    ) -> Result<TransitionOutcome, TransitionError> {
        let old_status = loan.status;
        let new_status = request.new_status;

        check_role_capability(request.actor, loan, new_status)?;
        check_transition(old_status, new_status)?;

        let mut updated_loan = loan.clone();
        let mut updated_book = book.clone();

        let ledger_effect = Self::ledger_effect_for(old_status, new_status);
        if let Some(effect) = ledger_effect {
            InventoryLedger::apply(&mut updated_book, effect, request.now)?;
        }

        match new_status {
            LoanStatus::Returned => {
                updated_loan.return_date = Some(request.now);
            }
            LoanStatus::Overdue => {
                // 进入 OVERDUE 时固定滞纳金，归还时不再重算
                updated_loan.late_fee_amount = calculate_late_fee(
                    loan.due_date,
                    request.now.date_naive(),
                    self.late_fee_per_day,
                );
            }
            _ => {}
        }

        updated_loan.status = new_status;
        updated_loan.notes = request.note.clone();
        updated_loan.updated_at = request.now;

        let history = LoanStatusHistoryEntry::new(
            &loan.id,
            Some(old_status),
            new_status,
            request.actor.map(|a| a.user_id.clone()),
            request.now,
            request.note.clone(),
        );

        Ok(TransitionOutcome {
            old_status,
            loan: updated_loan,
            ledger_effect,
            book: updated_book,
            history,
        })
    }
}
