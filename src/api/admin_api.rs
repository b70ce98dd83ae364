// ==========================================
// 图书馆借阅系统 - 管理 API
// ==========================================
// 职责: 系统统计、内置管理员初始化
// ==========================================

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::stats::SystemStats;
use crate::domain::types::UserRole;
use crate::domain::user::{Actor, User};
use crate::repository::stats_repo::StatsRepository;
use crate::repository::user_repo::UserRepository;

/// 内置管理员邮箱
pub const BUILTIN_ADMIN_EMAIL: &str = "admin@library.com";

pub struct AdminApi {
    user_repo: Arc<UserRepository>,
    stats_repo: Arc<StatsRepository>,
}

impl AdminApi {
    pub fn new(user_repo: Arc<UserRepository>, stats_repo: Arc<StatsRepository>) -> Self {
        Self {
            user_repo,
            stats_repo,
        }
    }

    /// 系统统计（仅管理员）
    pub fn system_stats(&self, actor: &Actor) -> ApiResult<SystemStats> {
        if !actor.is_admin() {
            return Err(ApiError::Forbidden("仅管理员可查看系统统计".to_string()));
        }
        Ok(self.stats_repo.system_stats(Utc::now())?)
    }

    /// 确保内置管理员存在（幂等）
    ///
    /// # 返回
    /// - Ok(User): 已存在或新建的管理员
    pub fn ensure_builtin_admin(&self) -> ApiResult<User> {
        if let Some(existing) = self.user_repo.find_by_email(BUILTIN_ADMIN_EMAIL)? {
            return Ok(existing);
        }

        let admin = User::new(
            BUILTIN_ADMIN_EMAIL,
            Some("System Administrator".to_string()),
            UserRole::Admin,
        );
        self.user_repo.insert(&admin)?;

        info!(operation = "ensure_builtin_admin", user_id = %admin.id, "内置管理员已创建");
        Ok(admin)
    }
}
