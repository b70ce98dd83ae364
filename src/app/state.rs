// ==========================================
// 图书馆借阅系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{AdminApi, LoanApi, UserActorResolver};
use crate::config::config_manager::ConfigManager;
use crate::config::lending_config_trait::LendingConfigReader;
use crate::db::{init_schema, open_sqlite_connection, read_schema_version};
use crate::repository::{
    BookRepository, BranchRepository, LoanHistoryRepository, LoanRepository, StatsRepository,
    UserRepository,
};

/// 应用状态
///
/// 包含所有API实例和共享资源，所有仓储共享同一条 SQLite 连接
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 借阅API
    pub loan_api: Arc<LoanApi>,

    /// 管理API
    pub admin_api: Arc<AdminApi>,

    /// 调用者身份解析
    pub actor_resolver: Arc<UserActorResolver>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,

    /// 图书仓储（馆藏录入）
    pub book_repo: Arc<BookRepository>,

    /// 分馆仓储
    pub branch_repo: Arc<BranchRepository>,

    /// 用户仓储
    pub user_repo: Arc<UserRepository>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 说明
    /// 1. 打开共享连接并应用统一 PRAGMA
    /// 2. 幂等建表
    /// 3. 初始化所有 Repository 与 API
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn =
            open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        init_schema(&conn).map_err(|e| format!("数据库初始化失败: {}", e))?;
        match read_schema_version(&conn) {
            Ok(version) => tracing::info!(schema_version = ?version, "数据库 schema 就绪"),
            Err(e) => tracing::warn!("读取 schema_version 失败(将继续启动): {}", e),
        }
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let user_repo = Arc::new(UserRepository::new(conn.clone()));
        let branch_repo = Arc::new(BranchRepository::new(conn.clone()));
        let book_repo = Arc::new(BookRepository::new(conn.clone()));
        let loan_repo = Arc::new(LoanRepository::new(conn.clone()));
        let history_repo = Arc::new(LoanHistoryRepository::new(conn.clone()));
        let stats_repo = Arc::new(StatsRepository::new(conn.clone()));

        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        // ==========================================
        // 初始化API层
        // ==========================================
        let config_reader: Arc<dyn LendingConfigReader> = config_manager.clone();
        let loan_api = Arc::new(LoanApi::new(
            conn.clone(),
            loan_repo,
            history_repo,
            config_reader,
        ));
        let admin_api = Arc::new(AdminApi::new(user_repo.clone(), stats_repo));
        let actor_resolver = Arc::new(UserActorResolver::new(user_repo.clone()));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            loan_api,
            admin_api,
            actor_resolver,
            config_manager,
            book_repo,
            branch_repo,
            user_repo,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先级: 环境变量 LIBRARY_DB_PATH > 用户数据目录 > 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("LIBRARY_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./library_lending.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("library-lending");
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("library_lending.db");
        }
    }

    path.to_string_lossy().to_string()
}
