// ==========================================
// 图书馆借阅系统 - 借阅单数据仓储
// ==========================================
// 职责: loans 表读写
// 红线: Repository 不含业务逻辑（状态转换由 LoanStateMachine 判定）
// 约束: 多实体写入通过 *_tx 函数在调用方事务内完成
// ==========================================

use crate::domain::loan::Loan;
use crate::domain::types::{LoanStatus, ACTIVE_STATUSES};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, Transaction};
use std::sync::{Arc, Mutex};


const LOAN_COLUMNS: &str = r#"
    id, member_id, book_id, branch_id, borrow_date, due_date, return_date,
    status, late_fee_amount, notes, created_at, updated_at
"#;

// ==========================================
// LoanQuery - 列表查询条件
// ==========================================
/// 各字段为 None 时不参与过滤
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoanQuery {
    pub member_id: Option<String>,
    pub branch_id: Option<String>,
    pub status: Option<LoanStatus>,
}

// ==========================================
// LoanRepository - 借阅单仓储
// ==========================================
pub struct LoanRepository {
    conn: Arc<Mutex<Connection>>,
}

impl LoanRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 写入操作（事务内）
    // ==========================================

    pub fn insert_tx(tx: &Transaction, loan: &Loan) -> RepositoryResult<()> {
        tx.execute(
            r#"
            INSERT INTO loans (
                id, member_id, book_id, branch_id, borrow_date, due_date, return_date,
                status, late_fee_amount, notes, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
            params![
                loan.id,
                loan.member_id,
                loan.book_id,
                loan.branch_id,
                loan.borrow_date,
                loan.due_date,
                loan.return_date,
                loan.status,
                loan.late_fee_amount,
                loan.notes,
                loan.created_at,
                loan.updated_at,
            ],
        )?;
        Ok(())
    }

    /// 写回状态变更涉及的可变字段
    pub fn update_tx(tx: &Transaction, loan: &Loan) -> RepositoryResult<()> {
        let rows = tx.execute(
            r#"
            UPDATE loans
            SET status = ?1,
                return_date = ?2,
                late_fee_amount = ?3,
                notes = ?4,
                updated_at = ?5
            WHERE id = ?6
            "#,
            params![
                loan.status,
                loan.return_date,
                loan.late_fee_amount,
                loan.notes,
                loan.updated_at,
                loan.id,
            ],
        )?;
        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Loan".to_string(),
                id: loan.id.clone(),
            });
        }
        Ok(())
    }

    // ==========================================
    // 查询操作
    // ==========================================

    pub fn find_by_id(&self, loan_id: &str) -> RepositoryResult<Option<Loan>> {
        let conn = self.get_conn()?;
        Self::find_by_id_tx(&conn, loan_id)
    }

    pub fn find_by_id_tx(conn: &Connection, loan_id: &str) -> RepositoryResult<Option<Loan>> {
        let sql = format!("SELECT {} FROM loans WHERE id = ?1", LOAN_COLUMNS);
        let loan = conn
            .query_row(&sql, params![loan_id], map_loan_row)
            .optional()?;
        Ok(loan)
    }

    /// 会员当前占用名额的借阅数（REQUESTED/APPROVED/BORROWED/OVERDUE）
    pub fn count_active_by_member_tx(conn: &Connection, member_id: &str) -> RepositoryResult<i64> {
        let count = conn.query_row(
            "SELECT COUNT(*) FROM loans WHERE member_id = ?1 AND status IN (?2, ?3, ?4, ?5)",
            params![
                member_id,
                ACTIVE_STATUSES[0],
                ACTIVE_STATUSES[1],
                ACTIVE_STATUSES[2],
                ACTIVE_STATUSES[3],
            ],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// 按状态查询（按应还日期升序）
    pub fn find_by_status(&self, status: LoanStatus) -> RepositoryResult<Vec<Loan>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM loans WHERE status = ?1 ORDER BY due_date ASC, id ASC",
            LOAN_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let loans = stmt
            .query_map(params![status], map_loan_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(loans)
    }

    /// 按条件查询（按借阅日期倒序）
    pub fn find_by_query(&self, query: &LoanQuery) -> RepositoryResult<Vec<Loan>> {
        let conn = self.get_conn()?;

        let mut sql = format!("SELECT {} FROM loans WHERE 1 = 1", LOAN_COLUMNS);
        let mut values: Vec<Value> = Vec::new();

        if let Some(member_id) = &query.member_id {
            values.push(Value::from(member_id.clone()));
            sql.push_str(&format!(" AND member_id = ?{}", values.len()));
        }
        if let Some(branch_id) = &query.branch_id {
            values.push(Value::from(branch_id.clone()));
            sql.push_str(&format!(" AND branch_id = ?{}", values.len()));
        }
        if let Some(status) = query.status {
            values.push(Value::from(status.to_db_str().to_string()));
            sql.push_str(&format!(" AND status = ?{}", values.len()));
        }

        sql.push_str(" ORDER BY borrow_date DESC, created_at DESC");

        let mut stmt = conn.prepare(&sql)?;
        let loans = stmt
            .query_map(params_from_iter(values.iter()), map_loan_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(loans)
    }

    /// 会员借阅历史（最新在前）
    pub fn find_by_member(&self, member_id: &str) -> RepositoryResult<Vec<Loan>> {
        self.find_by_query(&LoanQuery {
            member_id: Some(member_id.to_string()),
            ..Default::default()
        })
    }
}

fn map_loan_row(row: &Row<'_>) -> rusqlite::Result<Loan> {
    Ok(Loan {
        id: row.get(0)?,
        member_id: row.get(1)?,
        book_id: row.get(2)?,
        branch_id: row.get(3)?,
        borrow_date: row.get(4)?,
        due_date: row.get(5)?,
        return_date: row.get(6)?,
        status: row.get(7)?,
        late_fee_amount: row.get(8)?,
        notes: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}
