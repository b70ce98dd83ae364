// ==========================================
// 图书馆借阅系统 - 用户领域模型
// ==========================================
// 职责: 用户实体与已认证操作人 (Actor)
// 说明: 凭证签发/校验不在核心范围内
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::types::UserRole;

// ==========================================
// User - 用户
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,                 // 用户ID (UUID)
    pub email: String,              // 邮箱（唯一）
    pub full_name: Option<String>,  // 姓名
    pub role: UserRole,             // 角色
    pub is_active: bool,            // 是否启用
    pub is_blocked: bool,           // 是否封禁
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// 创建新的启用用户
    pub fn new(email: &str, full_name: Option<String>, role: UserRole) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            email: email.to_string(),
            full_name,
            role,
            is_active: true,
            is_blocked: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// 是否允许发起操作
    pub fn can_act(&self) -> bool {
        self.is_active && !self.is_blocked
    }

    /// 转换为操作人
    pub fn as_actor(&self) -> Actor {
        Actor {
            user_id: self.id.clone(),
            role: self.role,
        }
    }
}

// ==========================================
// Actor - 已认证操作人
// ==========================================
// 核心按原样信任该值
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: String,
    pub role: UserRole,
}

impl Actor {
    pub fn new(user_id: impl Into<String>, role: UserRole) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}
