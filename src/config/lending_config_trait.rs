// ==========================================
// 图书馆借阅系统 - 借阅策略读取 Trait
// ==========================================
// 职责: 定义借阅流程所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use serde::{Deserialize, Serialize};
use std::error::Error;

/// 默认借期（天）
pub const DEFAULT_LOAN_PERIOD_DAYS: i64 = 14;
/// 借期上限（天），超出视为配置错误
pub const MAX_LOAN_PERIOD_DAYS: i64 = 3650;
/// 默认日滞纳金
pub const DEFAULT_LATE_FEE_PER_DAY: f64 = 1.0;
/// 默认单会员在借上限
pub const DEFAULT_MAX_ACTIVE_LOANS: i64 = 5;
/// 默认逾期扫描间隔（秒）
pub const DEFAULT_OVERDUE_SWEEP_INTERVAL_SECS: u64 = 3600;

// ==========================================
// LendingPolicy - 借阅策略快照
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LendingPolicy {
    pub loan_period_days: i64,
    pub late_fee_per_day: f64,
    pub max_active_loans: i64,
    pub overdue_sweep_interval_secs: u64,
}

impl Default for LendingPolicy {
    fn default() -> Self {
        Self {
            loan_period_days: DEFAULT_LOAN_PERIOD_DAYS,
            late_fee_per_day: DEFAULT_LATE_FEE_PER_DAY,
            max_active_loans: DEFAULT_MAX_ACTIVE_LOANS,
            overdue_sweep_interval_secs: DEFAULT_OVERDUE_SWEEP_INTERVAL_SECS,
        }
    }
}

// ==========================================
// LendingConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
pub trait LendingConfigReader: Send + Sync {
    /// 借期天数（默认 14）
    fn get_loan_period_days(&self) -> Result<i64, Box<dyn Error>>;

    /// 每逾期一天的滞纳金（默认 1.0）
    fn get_late_fee_per_day(&self) -> Result<f64, Box<dyn Error>>;

    /// 单会员同时在借上限（默认 5）
    fn get_max_active_loans(&self) -> Result<i64, Box<dyn Error>>;

    /// 逾期扫描间隔秒数（默认 3600）
    fn get_overdue_sweep_interval_secs(&self) -> Result<u64, Box<dyn Error>>;

    /// 读取完整策略快照
    ///
    /// 读取失败时退回默认值并告警，借阅流程不因配置表异常而中断
    fn load_policy(&self) -> LendingPolicy {
        let defaults = LendingPolicy::default();

        let loan_period_days = self.get_loan_period_days().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "读取借期配置失败，使用默认值");
            defaults.loan_period_days
        });
        let late_fee_per_day = self.get_late_fee_per_day().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "读取滞纳金配置失败，使用默认值");
            defaults.late_fee_per_day
        });
        let max_active_loans = self.get_max_active_loans().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "读取在借上限配置失败，使用默认值");
            defaults.max_active_loans
        });
        let overdue_sweep_interval_secs =
            self.get_overdue_sweep_interval_secs().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "读取逾期扫描间隔配置失败，使用默认值");
                defaults.overdue_sweep_interval_secs
            });

        LendingPolicy {
            loan_period_days,
            late_fee_per_day,
            max_active_loans,
            overdue_sweep_interval_secs,
        }
    }
}
