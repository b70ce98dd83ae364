// ==========================================
// 图书馆借阅系统 - 借阅状态历史仓储
// ==========================================
// 红线: 只追加，不提供 update/delete
// ==========================================

use crate::domain::loan::LoanStatusHistoryEntry;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Row, Transaction};
use std::sync::{Arc, Mutex};

pub struct LoanHistoryRepository {
    conn: Arc<Mutex<Connection>>,
}

impl LoanHistoryRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 追加一条历史（与借阅单变更同一事务）
    pub fn insert_tx(tx: &Transaction, entry: &LoanStatusHistoryEntry) -> RepositoryResult<()> {
        tx.execute(
            r#"
            INSERT INTO loan_status_history (
                id, loan_id, old_status, new_status, changed_by, changed_at, note
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                entry.id,
                entry.loan_id,
                entry.old_status,
                entry.new_status,
                entry.changed_by,
                entry.changed_at,
                entry.note,
            ],
        )?;
        Ok(())
    }

    /// 查询借阅单的全部历史（按时间升序）
    pub fn find_by_loan_id(&self, loan_id: &str) -> RepositoryResult<Vec<LoanStatusHistoryEntry>> {
        let conn = self.get_conn()?;
        Self::find_by_loan_id_tx(&conn, loan_id)
    }

    pub fn find_by_loan_id_tx(
        conn: &Connection,
        loan_id: &str,
    ) -> RepositoryResult<Vec<LoanStatusHistoryEntry>> {
        // rowid 作为同一时刻写入时的次序兜底
        let mut stmt = conn.prepare(
            r#"
            SELECT id, loan_id, old_status, new_status, changed_by, changed_at, note
            FROM loan_status_history
            WHERE loan_id = ?1
            ORDER BY changed_at ASC, rowid ASC
            "#,
        )?;
        let entries = stmt
            .query_map(params![loan_id], map_history_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}

fn map_history_row(row: &Row<'_>) -> rusqlite::Result<LoanStatusHistoryEntry> {
    Ok(LoanStatusHistoryEntry {
        id: row.get(0)?,
        loan_id: row.get(1)?,
        old_status: row.get(2)?,
        new_status: row.get(3)?,
        changed_by: row.get(4)?,
        changed_at: row.get(5)?,
        note: row.get(6)?,
    })
}
