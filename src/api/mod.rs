// ==========================================
// 图书馆借阅系统 - API 层
// ==========================================
// 职责: 对外业务接口，组合 Repository 与 Engine
// 约束: 调用者身份由上层认证后以 Actor 形式传入
// ==========================================

pub mod actor;
pub mod admin_api;
pub mod error;
pub mod loan_api;

pub use actor::{ActorResolver, UserActorResolver};
pub use admin_api::{AdminApi, BUILTIN_ADMIN_EMAIL};
pub use error::{ApiError, ApiResult};
pub use loan_api::{LoanApi, LoanFilter};
