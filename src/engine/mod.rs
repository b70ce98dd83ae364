// ==========================================
// 图书馆借阅系统 - 引擎层
// ==========================================
// 职责: 实现借阅业务规则,不拼 SQL
// 红线: Engine 不直接写库,只计算并返回结果
// ==========================================

pub mod late_fee;
pub mod ledger;
pub mod overdue;
pub mod state_machine;
pub mod transition;

// 重导出核心引擎
pub use late_fee::{calculate_late_fee, days_overdue, LATE_FEE_PER_DAY};
pub use ledger::{InventoryLedger, LedgerEffect};
pub use overdue::{is_overdue_candidate, select_candidates, OverdueSweepReport, SYSTEM_OVERDUE_NOTE};
pub use state_machine::{LoanStateMachine, TransitionOutcome, TransitionRequest};
pub use transition::{
    allowed_targets, check_role_capability, check_transition, is_transition_allowed,
    TransitionError,
};
