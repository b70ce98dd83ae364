// ==========================================
// 图书馆借阅系统 - 状态转换表与角色能力判定
// ==========================================
// 职责: "能到达哪些状态" 与 "谁可以发起" 两个关注点分离
// 红线: 表驱动,不写按角色的 if 链
// 红线: Engine 不拼 SQL
// ==========================================

use thiserror::Error;

use crate::domain::loan::Loan;
use crate::domain::types::{LoanStatus, UserRole};
use crate::domain::user::Actor;

// ==========================================
// TransitionError - 状态转换错误
// ==========================================
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransitionError {
    #[error("无权执行该操作: {reason}")]
    Forbidden { reason: String },

    #[error("无效的状态转换: from={from} to={to}")]
    InvalidTransition { from: LoanStatus, to: LoanStatus },

    #[error("库存不足: book_id={book_id}")]
    OutOfStock { book_id: String },
}

// ==========================================
// 状态转换表
// ==========================================

/// 返回从 `from` 出发允许到达的状态集合
pub fn allowed_targets(from: LoanStatus) -> &'static [LoanStatus] {
    use LoanStatus::*;
    match from {
        Requested => &[Canceled, Approved],
        Approved => &[Borrowed, Canceled],
        Borrowed => &[Returned, Lost, Overdue],
        Overdue => &[Returned, Lost],
        Returned | Lost | Canceled => &[],
    }
}

pub fn is_transition_allowed(from: LoanStatus, to: LoanStatus) -> bool {
    allowed_targets(from).contains(&to)
}

/// 校验转换表，失败时返回 InvalidTransition（带当前与目标状态）
pub fn check_transition(from: LoanStatus, to: LoanStatus) -> Result<(), TransitionError> {
    if is_transition_allowed(from, to) {
        Ok(())
    } else {
        Err(TransitionError::InvalidTransition { from, to })
    }
}

// ==========================================
// 角色能力判定
// ==========================================

/// 馆员可提交的目标状态
const LIBRARIAN_TARGETS: [LoanStatus; 4] = [
    LoanStatus::Approved,
    LoanStatus::Borrowed,
    LoanStatus::Returned,
    LoanStatus::Lost,
];

/// 角色前置校验（在转换表之前执行）
///
/// # 参数
/// - `actor`: 操作人；None 表示系统自动变更，与管理员一样豁免
/// - `loan`: 当前借阅单
/// - `to`: 目标状态
///
/// # 规则
/// - 会员: 只能取消自己名下、处于 REQUESTED 的借阅
/// - 馆员: 目标状态只能是 APPROVED / BORROWED / RETURNED / LOST
/// - 管理员: 豁免，只受转换表约束
pub fn check_role_capability(
    actor: Option<&Actor>,
    loan: &Loan,
    to: LoanStatus,
) -> Result<(), TransitionError> {
    let Some(actor) = actor else {
        return Ok(());
    };

    match actor.role {
        UserRole::Admin => Ok(()),
        UserRole::Librarian => {
            if LIBRARIAN_TARGETS.contains(&to) {
                Ok(())
            } else {
                Err(TransitionError::Forbidden {
                    reason: format!("馆员不能将借阅设置为{}", to),
                })
            }
        }
        UserRole::Member => {
            if !loan.is_owned_by(&actor.user_id) {
                return Err(TransitionError::Forbidden {
                    reason: "会员只能操作自己的借阅".to_string(),
                });
            }
            if loan.status == LoanStatus::Requested && to == LoanStatus::Canceled {
                Ok(())
            } else {
                Err(TransitionError::Forbidden {
                    reason: "会员只能取消处于REQUESTED的借阅".to_string(),
                })
            }
        }
    }
}
