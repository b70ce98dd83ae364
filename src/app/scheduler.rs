// ==========================================
// 图书馆借阅系统 - 逾期扫描调度器
// ==========================================
// 职责: 按固定间隔触发逾期扫描
// 约束: 扫描本身是同步数据库操作，放在 blocking 线程池执行
// 红线: 单轮失败只记录日志，不终止调度循环
// ==========================================

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use crate::api::LoanApi;

pub struct OverdueScheduler {
    loan_api: Arc<LoanApi>,
    interval: Duration,
}

impl OverdueScheduler {
    pub fn new(loan_api: Arc<LoanApi>, interval: Duration) -> Self {
        Self { loan_api, interval }
    }

    /// 执行一轮扫描
    ///
    /// # 返回
    /// - Ok(n): 本轮转为 OVERDUE 的数量
    /// - Err(String): 扫描失败或任务执行失败
    pub async fn run_once(&self) -> Result<usize, String> {
        let loan_api = self.loan_api.clone();
        tokio::task::spawn_blocking(move || loan_api.run_overdue_sweep())
            .await
            .map_err(|e| format!("任务执行失败: {}", e))?
            .map_err(|e| e.to_string())
    }

    /// 循环调度直到 shutdown 完成
    ///
    /// 首个 tick 立即触发，启动时会先扫描一轮
    pub async fn run_until<F>(self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        tracing::info!(interval_secs = self.interval.as_secs(), "逾期扫描调度器已启动");

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("逾期扫描调度器收到停止信号");
                    break;
                }
                _ = ticker.tick() => {
                    match self.run_once().await {
                        Ok(updated) => tracing::info!(updated = updated, "定时逾期扫描完成"),
                        Err(e) => tracing::error!(error = %e, "定时逾期扫描失败"),
                    }
                }
            }
        }
    }
}
