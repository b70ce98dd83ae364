// ==========================================
// 图书馆借阅系统 - 后台服务入口
// ==========================================
// 职责: 初始化日志与数据库、确保内置管理员、运行逾期扫描调度
// ==========================================

use std::time::Duration;

use anyhow::Context;
use library_lending::app::{get_default_db_path, AppState, OverdueScheduler};
use library_lending::config::LendingConfigReader;
use library_lending::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", library_lending::APP_NAME);
    tracing::info!("系统版本: {}", library_lending::VERSION);
    tracing::info!("==================================================");

    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    let app_state = AppState::new(db_path)
        .map_err(anyhow::Error::msg)
        .context("无法初始化AppState")?;

    let admin = app_state
        .admin_api
        .ensure_builtin_admin()
        .context("内置管理员初始化失败")?;
    tracing::info!(user_id = %admin.id, email = %admin.email, "内置管理员就绪");

    let policy = app_state.config_manager.load_policy();
    tracing::info!(?policy, "借阅策略已加载");

    let scheduler = OverdueScheduler::new(
        app_state.loan_api.clone(),
        Duration::from_secs(policy.overdue_sweep_interval_secs),
    );

    scheduler
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "监听退出信号失败");
            }
        })
        .await;

    tracing::info!("服务已停止");
    Ok(())
}
