// ==========================================
// 图书馆借阅系统 - 调用者身份解析
// ==========================================
// 职责: 将已认证的用户ID解析为 Actor（角色 + ID）
// 说明: 凭证签发/校验不在本层，调用方只交付用户ID
// ==========================================

use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::user::Actor;
use crate::repository::user_repo::UserRepository;

/// Actor 解析接口
pub trait ActorResolver: Send + Sync {
    /// # 返回
    /// - `Ok(Actor)`: 用户存在且可操作
    /// - `Err(NotFound)`: 用户不存在
    /// - `Err(Forbidden)`: 用户已停用或被封禁
    fn resolve(&self, user_id: &str) -> ApiResult<Actor>;
}

/// 基于 users 表的解析实现
pub struct UserActorResolver {
    user_repo: Arc<UserRepository>,
}

impl UserActorResolver {
    pub fn new(user_repo: Arc<UserRepository>) -> Self {
        Self { user_repo }
    }
}

impl ActorResolver for UserActorResolver {
    fn resolve(&self, user_id: &str) -> ApiResult<Actor> {
        let user = self
            .user_repo
            .find_by_id(user_id)?
            .ok_or_else(|| ApiError::NotFound(format!("用户(id={})不存在", user_id)))?;

        if !user.is_active {
            return Err(ApiError::Forbidden(format!("用户已停用: {}", user_id)));
        }
        if user.is_blocked {
            return Err(ApiError::Forbidden(format!("用户已封禁: {}", user_id)));
        }

        Ok(user.as_actor())
    }
}
