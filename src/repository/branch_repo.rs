// ==========================================
// 图书馆借阅系统 - 分馆数据仓储
// ==========================================

use crate::domain::book::LibraryBranch;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

const BRANCH_COLUMNS: &str =
    "id, name, address, phone_number, email, is_active, created_at, updated_at";

pub struct BranchRepository {
    conn: Arc<Mutex<Connection>>,
}

impl BranchRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert(&self, branch: &LibraryBranch) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO library_branches (
                id, name, address, phone_number, email, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                branch.id,
                branch.name,
                branch.address,
                branch.phone_number,
                branch.email,
                branch.is_active,
                branch.created_at,
                branch.updated_at,
            ],
        )?;
        Ok(())
    }

    pub fn find_by_id(&self, branch_id: &str) -> RepositoryResult<Option<LibraryBranch>> {
        let conn = self.get_conn()?;
        Self::find_by_id_tx(&conn, branch_id)
    }

    /// 事务内按ID查询（调用方已持有连接）
    pub fn find_by_id_tx(
        conn: &Connection,
        branch_id: &str,
    ) -> RepositoryResult<Option<LibraryBranch>> {
        let sql = format!(
            "SELECT {} FROM library_branches WHERE id = ?1",
            BRANCH_COLUMNS
        );
        let branch = conn
            .query_row(&sql, params![branch_id], map_branch_row)
            .optional()?;
        Ok(branch)
    }

    pub fn list_all(&self) -> RepositoryResult<Vec<LibraryBranch>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM library_branches ORDER BY name",
            BRANCH_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let branches = stmt
            .query_map([], map_branch_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(branches)
    }
}

fn map_branch_row(row: &Row<'_>) -> rusqlite::Result<LibraryBranch> {
    Ok(LibraryBranch {
        id: row.get(0)?,
        name: row.get(1)?,
        address: row.get(2)?,
        phone_number: row.get(3)?,
        email: row.get(4)?,
        is_active: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}
