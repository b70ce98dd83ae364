// ==========================================
// API集成测试辅助工具
// ==========================================
// 职责: 提供借阅API集成测试的通用环境与数据准备
// ==========================================

#[path = "../test_helpers.rs"]
mod test_helpers;

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use tempfile::NamedTempFile;

use library_lending::api::{AdminApi, ApiResult, LoanApi, UserActorResolver};
use library_lending::app::AppState;
use library_lending::config::{ConfigManager, LendingConfigReader};
use library_lending::db::open_sqlite_connection;
use library_lending::domain::book::{Book, LibraryBranch};
use library_lending::domain::loan::Loan;
use library_lending::domain::types::{LoanStatus, UserRole};
use library_lending::domain::user::{Actor, User};
use library_lending::repository::{
    BookRepository, BranchRepository, LoanHistoryRepository, LoanRepository, UserRepository,
};

use super::test_data_builder::{BookBuilder, BranchBuilder, UserBuilder};

// ==========================================
// 借阅测试环境
// ==========================================

/// 借阅测试环境
///
/// 通过 AppState 组装，与生产装配路径一致
pub struct LendingTestEnv {
    pub db_path: String,
    pub loan_api: Arc<LoanApi>,
    pub admin_api: Arc<AdminApi>,
    pub actor_resolver: Arc<UserActorResolver>,
    pub config_manager: Arc<ConfigManager>,

    // Repository层（用于测试数据准备）
    pub user_repo: Arc<UserRepository>,
    pub branch_repo: Arc<BranchRepository>,
    pub book_repo: Arc<BookRepository>,

    // 临时文件（确保生命周期）
    _temp_file: NamedTempFile,
}

impl LendingTestEnv {
    /// 创建新的测试环境（临时数据库 + 完整装配）
    pub fn new() -> Result<Self, String> {
        let (temp_file, db_path) = test_helpers::create_test_db()
            .map_err(|e| format!("创建测试数据库失败: {}", e))?;

        let state = AppState::new(db_path.clone())?;

        Ok(Self {
            db_path,
            loan_api: state.loan_api,
            admin_api: state.admin_api,
            actor_resolver: state.actor_resolver,
            config_manager: state.config_manager,
            user_repo: state.user_repo,
            branch_repo: state.branch_repo,
            book_repo: state.book_repo,
            _temp_file: temp_file,
        })
    }

    /// 在同一数据库上用指定的策略读取器装配 LoanApi
    pub fn loan_api_with_config(&self, config: Arc<dyn LendingConfigReader>) -> LoanApi {
        let conn = Arc::new(Mutex::new(self.raw_conn()));
        LoanApi::new(
            conn.clone(),
            Arc::new(LoanRepository::new(conn.clone())),
            Arc::new(LoanHistoryRepository::new(conn)),
            config,
        )
    }

    /// 独立连接（用于直接构造边界数据）
    pub fn raw_conn(&self) -> Connection {
        open_sqlite_connection(&self.db_path).expect("无法打开测试数据库")
    }

    // ==========================================
    // 数据准备
    // ==========================================

    pub fn insert_user(&self, user: User) -> User {
        self.user_repo.insert(&user).expect("插入用户失败");
        user
    }

    pub fn member(&self, email: &str) -> (User, Actor) {
        let user = self.insert_user(UserBuilder::new(email).role(UserRole::Member).build());
        let actor = user.as_actor();
        (user, actor)
    }

    pub fn librarian(&self, email: &str) -> Actor {
        self.insert_user(UserBuilder::new(email).role(UserRole::Librarian).build())
            .as_actor()
    }

    pub fn admin(&self, email: &str) -> Actor {
        self.insert_user(UserBuilder::new(email).role(UserRole::Admin).build())
            .as_actor()
    }

    pub fn branch(&self, name: &str) -> LibraryBranch {
        let branch = BranchBuilder::new(name).build();
        self.branch_repo.insert(&branch).expect("插入分馆失败");
        branch
    }

    pub fn book(&self, branch: &LibraryBranch, isbn: &str, total: i64, available: i64) -> Book {
        let book = BookBuilder::new(isbn, &branch.id)
            .copies(total)
            .available(available)
            .build();
        self.book_repo.insert(&book).expect("插入图书失败");
        book
    }

    pub fn set_config(&self, key: &str, value: &str) {
        self.config_manager
            .set_global_config_value(key, value)
            .expect("写入配置失败");
    }

    // ==========================================
    // 借阅流程快捷操作
    // ==========================================

    pub fn request_loan(&self, member: &Actor, book: &Book) -> ApiResult<Loan> {
        self.loan_api
            .create_loan(member, &book.id, &book.branch_id, None)
    }

    /// REQUESTED -> APPROVED -> BORROWED
    pub fn borrowed_loan(&self, member: &Actor, librarian: &Actor, book: &Book) -> Loan {
        let loan = self.request_loan(member, book).expect("创建借阅失败");
        self.loan_api
            .change_status(&loan.id, LoanStatus::Approved, Some(librarian), None)
            .expect("审批失败");
        self.loan_api
            .change_status(&loan.id, LoanStatus::Borrowed, Some(librarian), None)
            .expect("借出失败")
    }

    // ==========================================
    // 直接读写（断言用）
    // ==========================================

    pub fn available_copies(&self, book_id: &str) -> i64 {
        self.book_repo
            .find_by_id(book_id)
            .expect("查询图书失败")
            .expect("图书不存在")
            .available_copies
    }

    pub fn loan(&self, loan_id: &str) -> Loan {
        self.loan_api
            .get_loan_detail(loan_id, &Actor::new("test-admin", UserRole::Admin))
            .expect("查询借阅失败")
            .loan
    }

    pub fn history_len(&self, loan_id: &str) -> i64 {
        self.raw_conn()
            .query_row(
                "SELECT COUNT(*) FROM loan_status_history WHERE loan_id = ?1",
                params![loan_id],
                |row| row.get(0),
            )
            .expect("查询历史失败")
    }

    /// 直接改写应还日期（构造逾期场景）
    pub fn set_due_date(&self, loan_id: &str, due_date: DateTime<Utc>) {
        self.raw_conn()
            .execute(
                "UPDATE loans SET due_date = ?1 WHERE id = ?2",
                params![due_date, loan_id],
            )
            .expect("改写应还日期失败");
    }
}
