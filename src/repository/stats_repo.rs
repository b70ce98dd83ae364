// ==========================================
// 图书馆借阅系统 - 系统统计查询
// ==========================================
// 职责: 聚合读模型（管理员总览），只读
// ==========================================

use crate::domain::stats::SystemStats;
use crate::domain::types::{LoanStatus, ACTIVE_STATUSES};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

pub struct StatsRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StatsRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 汇总系统统计（now 决定"最近30天"窗口）
    pub fn system_stats(&self, now: DateTime<Utc>) -> RepositoryResult<SystemStats> {
        let conn = self.get_conn()?;

        let (total_users, total_members, total_librarians, total_admins) = conn.query_row(
            r#"
            SELECT
                COUNT(*),
                COALESCE(SUM(CASE WHEN role = 'MEMBER' THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN role = 'LIBRARIAN' THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN role = 'ADMIN' THEN 1 ELSE 0 END), 0)
            FROM users
            "#,
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )?;

        let (total_branches, active_branches) = conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(is_active), 0) FROM library_branches",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let (total_books, total_book_copies, total_available_copies) = conn.query_row(
            r#"
            SELECT COUNT(*), COALESCE(SUM(total_copies), 0), COALESCE(SUM(available_copies), 0)
            FROM books
            "#,
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;

        let total_loans: i64 =
            conn.query_row("SELECT COUNT(*) FROM loans", [], |row| row.get(0))?;

        let active_loans: i64 = conn.query_row(
            "SELECT COUNT(*) FROM loans WHERE status IN (?1, ?2, ?3, ?4)",
            params![
                ACTIVE_STATUSES[0],
                ACTIVE_STATUSES[1],
                ACTIVE_STATUSES[2],
                ACTIVE_STATUSES[3],
            ],
            |row| row.get(0),
        )?;

        let overdue_loans: i64 = conn.query_row(
            "SELECT COUNT(*) FROM loans WHERE status = ?1",
            params![LoanStatus::Overdue],
            |row| row.get(0),
        )?;

        let loans_last_30_days: i64 = conn.query_row(
            "SELECT COUNT(*) FROM loans WHERE created_at >= ?1",
            params![now - Duration::days(30)],
            |row| row.get(0),
        )?;

        Ok(SystemStats {
            total_users,
            total_members,
            total_librarians,
            total_admins,
            total_branches,
            active_branches,
            total_books,
            total_book_copies,
            total_available_copies,
            total_loans,
            active_loans,
            overdue_loans,
            loans_last_30_days,
        })
    }
}
