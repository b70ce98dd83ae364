// ==========================================
// 图书馆借阅系统 - 借阅 API
// ==========================================
// 职责: 借阅创建、状态变更、逾期扫描、借阅查询
// 约束: 每个写操作是一个 BEGIN IMMEDIATE 事务
//       （借阅单 + 库存台账 + 历史记录同时成功或同时回滚）
// 约束: 事务内重新读取借阅单，状态以事务内读到的为准
// 红线: 持有连接锁期间不得调用会再次加锁的仓储实例方法/配置读取
// ==========================================

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{Connection, TransactionBehavior};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::config::lending_config_trait::LendingConfigReader;
use crate::domain::loan::{Loan, LoanStatusHistoryEntry, LoanWithHistory};
use crate::domain::types::{LoanStatus, UserRole};
use crate::domain::user::Actor;
use crate::engine::overdue::{
    is_overdue_candidate, select_candidates, OverdueSweepReport, SYSTEM_OVERDUE_NOTE,
};
use crate::engine::state_machine::{LoanStateMachine, TransitionOutcome, TransitionRequest};
use crate::repository::book_repo::BookRepository;
use crate::repository::branch_repo::BranchRepository;
use crate::repository::loan_history_repo::LoanHistoryRepository;
use crate::repository::loan_repo::{LoanQuery, LoanRepository};

// ==========================================
// LoanFilter - 借阅列表过滤条件
// ==========================================
/// 过滤条件按调用者角色裁剪：
/// - 会员: 只能看到自己的借阅，member_id / branch_id 被忽略
/// - 馆员: 可按分馆过滤，member_id 被忽略
/// - 管理员: 可按会员与分馆过滤
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoanFilter {
    pub member_id: Option<String>,
    pub branch_id: Option<String>,
    pub status: Option<LoanStatus>,
}

impl LoanFilter {
    fn scoped_for(&self, actor: &Actor) -> LoanQuery {
        match actor.role {
            UserRole::Member => LoanQuery {
                member_id: Some(actor.user_id.clone()),
                branch_id: None,
                status: self.status,
            },
            UserRole::Librarian => LoanQuery {
                member_id: None,
                branch_id: self.branch_id.clone(),
                status: self.status,
            },
            UserRole::Admin => LoanQuery {
                member_id: self.member_id.clone(),
                branch_id: self.branch_id.clone(),
                status: self.status,
            },
        }
    }
}

// ==========================================
// LoanApi - 借阅 API
// ==========================================
pub struct LoanApi {
    conn: Arc<Mutex<Connection>>,
    loan_repo: Arc<LoanRepository>,
    history_repo: Arc<LoanHistoryRepository>,
    config: Arc<dyn LendingConfigReader>,
}

impl LoanApi {
    pub fn new(
        conn: Arc<Mutex<Connection>>,
        loan_repo: Arc<LoanRepository>,
        history_repo: Arc<LoanHistoryRepository>,
        config: Arc<dyn LendingConfigReader>,
    ) -> Self {
        Self {
            conn,
            loan_repo,
            history_repo,
            config,
        }
    }

    fn lock_conn(&self) -> ApiResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", e)))
    }

    // ==========================================
    // 写入接口
    // ==========================================

    /// 创建借阅申请
    ///
    /// # 参数
    /// - actor: 调用者（会员或管理员，借阅归属于调用者本人）
    /// - book_id / branch_id: 图书与分馆
    /// - notes: 备注（同时写入初始历史记录）
    ///
    /// # 校验顺序
    /// 角色 -> 图书存在 -> 分馆存在 -> 在借上限 -> 可借副本
    ///
    /// # 说明
    /// 申请不占用库存，库存在 BORROWED 时扣减
    #[instrument(skip(self, actor, notes), fields(user_id = %actor.user_id))]
    pub fn create_loan(
        &self,
        actor: &Actor,
        book_id: &str,
        branch_id: &str,
        notes: Option<String>,
    ) -> ApiResult<Loan> {
        if book_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("图书ID不能为空".to_string()));
        }
        if branch_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("分馆ID不能为空".to_string()));
        }
        if actor.role == UserRole::Librarian {
            return Err(ApiError::Forbidden("馆员不能创建借阅申请".to_string()));
        }

        let policy = self.config.load_policy();
        let now = Utc::now();

        // 持锁前构造借阅单，借期异常不会在事务内中断
        let mut loan = Loan::new_request(
            &actor.user_id,
            book_id,
            branch_id,
            now,
            policy.loan_period_days,
        )
        .ok_or_else(|| {
            ApiError::InvalidInput(format!("借期天数超出范围: {}", policy.loan_period_days))
        })?;
        loan.notes = notes.clone();

        let mut conn = self.lock_conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let book = BookRepository::find_by_id_tx(&tx, book_id)?
            .ok_or_else(|| ApiError::NotFound(format!("图书(id={})不存在", book_id)))?;
        BranchRepository::find_by_id_tx(&tx, branch_id)?
            .ok_or_else(|| ApiError::NotFound(format!("分馆(id={})不存在", branch_id)))?;

        // 计数与插入在同一写事务内，并发创建不会越过上限
        let active = LoanRepository::count_active_by_member_tx(&tx, &actor.user_id)?;
        if active >= policy.max_active_loans {
            return Err(ApiError::LoanLimitExceeded {
                member_id: actor.user_id.clone(),
                limit: policy.max_active_loans,
            });
        }

        if book.available_copies < 1 {
            return Err(ApiError::NoAvailableCopies(book.id));
        }

        let history = LoanStatusHistoryEntry::new(
            &loan.id,
            None,
            LoanStatus::Requested,
            Some(actor.user_id.clone()),
            now,
            notes,
        );

        LoanRepository::insert_tx(&tx, &loan)?;
        LoanHistoryRepository::insert_tx(&tx, &history)?;
        tx.commit()?;

        info!(
            operation = "create_loan",
            loan_id = %loan.id,
            book_id = %loan.book_id,
            branch_id = %loan.branch_id,
            new_status = %loan.status,
            user_id = %actor.user_id,
            active_before = active,
            "借阅申请已创建"
        );

        Ok(loan)
    }

    /// 变更借阅状态
    ///
    /// # 参数
    /// - loan_id: 借阅单ID
    /// - new_status: 目标状态
    /// - actor: 调用者；None 表示系统操作
    /// - note: 备注（覆盖借阅单 notes，并写入历史）
    ///
    /// # 返回
    /// - Ok(Loan): 变更后的借阅单
    /// - Err(NotFound | Forbidden | InvalidTransition | OutOfStock | 存储错误)
    ///
    /// 失败时借阅单、库存与历史均不变
    #[instrument(skip(self, actor, note), fields(to = %new_status))]
    pub fn change_status(
        &self,
        loan_id: &str,
        new_status: LoanStatus,
        actor: Option<&Actor>,
        note: Option<String>,
    ) -> ApiResult<Loan> {
        let policy = self.config.load_policy();
        let machine = LoanStateMachine::new(policy.late_fee_per_day);

        let request = TransitionRequest {
            new_status,
            actor,
            note,
            now: Utc::now(),
        };

        let outcome = self
            .commit_transition(loan_id, &request, &machine, |_| true)?
            .ok_or_else(|| ApiError::InternalError(format!("借阅单状态变更未执行: {}", loan_id)))?;

        log_transition("change_status", &outcome, actor);
        Ok(outcome.loan)
    }

    // ==========================================
    // 逾期扫描
    // ==========================================

    /// 逾期扫描（调度器入口）
    ///
    /// # 返回
    /// - Ok(n): 本轮转为 OVERDUE 的数量
    pub fn run_overdue_sweep(&self) -> ApiResult<usize> {
        Ok(self.run_overdue_sweep_at(Utc::now())?.updated_count)
    }

    /// 逾期扫描（请求入口，仅管理员）
    pub fn run_overdue_sweep_as(&self, actor: &Actor) -> ApiResult<usize> {
        if !actor.is_admin() {
            return Err(ApiError::Forbidden("仅管理员可触发逾期扫描".to_string()));
        }
        self.run_overdue_sweep()
    }

    /// 以指定时间执行逾期扫描
    ///
    /// 每笔候选使用独立事务，单笔业务失败记录后跳过，
    /// 存储层故障中止本轮（已提交的变更保留）
    pub fn run_overdue_sweep_at(&self, now: DateTime<Utc>) -> ApiResult<OverdueSweepReport> {
        let policy = self.config.load_policy();
        let machine = LoanStateMachine::new(policy.late_fee_per_day);
        let today = now.date_naive();

        let borrowed = self.loan_repo.find_by_status(LoanStatus::Borrowed)?;
        let candidates = select_candidates(&borrowed, today);

        let mut report = OverdueSweepReport {
            scanned_count: candidates.len(),
            ..Default::default()
        };

        for loan_id in candidates {
            let request = TransitionRequest {
                new_status: LoanStatus::Overdue,
                actor: None,
                note: Some(SYSTEM_OVERDUE_NOTE.to_string()),
                now,
            };

            // 候选在查询后可能已被归还/挂失，事务内再确认一次
            let result = self.commit_transition(&loan_id, &request, &machine, |loan| {
                is_overdue_candidate(loan, today)
            });

            match result {
                Ok(Some(outcome)) => {
                    report.record_updated();
                    log_transition("overdue_sweep", &outcome, None);
                }
                Ok(None) => {
                    report.record_skipped();
                    debug!(loan_id = %loan_id, "借阅单已不满足逾期条件，跳过");
                }
                Err(e) if e.is_store_error() => {
                    error!(loan_id = %loan_id, error = %e, "逾期扫描遇到存储错误，中止本轮");
                    return Err(e);
                }
                Err(e) => {
                    warn!(loan_id = %loan_id, error = %e, "逾期标记失败，跳过");
                    report.record_failed(&loan_id);
                }
            }
        }

        info!(
            operation = "overdue_sweep",
            scanned = report.scanned_count,
            updated = report.updated_count,
            skipped = report.skipped_count,
            failed = report.failed_loan_ids.len(),
            "逾期扫描完成"
        );

        Ok(report)
    }

    // ==========================================
    // 查询接口
    // ==========================================

    /// 借阅详情（含状态历史）；会员只能查看自己的借阅
    pub fn get_loan_detail(&self, loan_id: &str, actor: &Actor) -> ApiResult<LoanWithHistory> {
        let loan = self
            .loan_repo
            .find_by_id(loan_id)?
            .ok_or_else(|| ApiError::NotFound(format!("借阅单(id={})不存在", loan_id)))?;

        if actor.role == UserRole::Member && !loan.is_owned_by(&actor.user_id) {
            return Err(ApiError::Forbidden("会员只能查看自己的借阅".to_string()));
        }

        let status_history = self.history_repo.find_by_loan_id(loan_id)?;
        Ok(LoanWithHistory {
            loan,
            status_history,
        })
    }

    /// 借阅列表（按借阅日期倒序，过滤条件按角色裁剪）
    pub fn list_loans(&self, actor: &Actor, filter: &LoanFilter) -> ApiResult<Vec<Loan>> {
        let query = filter.scoped_for(actor);
        Ok(self.loan_repo.find_by_query(&query)?)
    }

    /// 调用者本人的借阅历史（最新在前）
    pub fn my_history(&self, actor: &Actor) -> ApiResult<Vec<Loan>> {
        Ok(self.loan_repo.find_by_member(&actor.user_id)?)
    }

    // ==========================================
    // 内部实现
    // ==========================================

    /// 在单个写事务内执行一次状态变更
    ///
    /// precondition 对事务内读到的借阅单返回 false 时不做变更，返回 Ok(None)
    fn commit_transition(
        &self,
        loan_id: &str,
        request: &TransitionRequest<'_>,
        machine: &LoanStateMachine,
        precondition: impl Fn(&Loan) -> bool,
    ) -> ApiResult<Option<TransitionOutcome>> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let loan = LoanRepository::find_by_id_tx(&tx, loan_id)?
            .ok_or_else(|| ApiError::NotFound(format!("借阅单(id={})不存在", loan_id)))?;
        if !precondition(&loan) {
            return Ok(None);
        }

        let book = BookRepository::find_by_id_tx(&tx, &loan.book_id)?
            .ok_or_else(|| ApiError::NotFound(format!("图书(id={})不存在", loan.book_id)))?;

        let outcome = machine.apply(&loan, &book, request)?;

        if outcome.ledger_effect.is_some() {
            BookRepository::update_available_copies_tx(
                &tx,
                &outcome.book.id,
                outcome.book.available_copies,
                request.now,
            )?;
        }
        LoanRepository::update_tx(&tx, &outcome.loan)?;
        LoanHistoryRepository::insert_tx(&tx, &outcome.history)?;

        tx.commit()?;
        Ok(Some(outcome))
    }
}

fn log_transition(operation: &str, outcome: &TransitionOutcome, actor: Option<&Actor>) {
    info!(
        operation = operation,
        loan_id = %outcome.loan.id,
        book_id = %outcome.loan.book_id,
        branch_id = %outcome.loan.branch_id,
        old_status = %outcome.old_status,
        new_status = %outcome.loan.status,
        user_id = actor.map(|a| a.user_id.as_str()).unwrap_or("system"),
        available_copies = outcome.book.available_copies,
        late_fee = outcome.loan.late_fee_amount,
        "借阅状态已变更"
    );
}
