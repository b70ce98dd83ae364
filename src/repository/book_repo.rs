// ==========================================
// 图书馆借阅系统 - 图书数据仓储
// ==========================================
// 职责: books 表 CRUD + 可借副本数写回
// 红线: 副本增减的判定在 InventoryLedger，这里只落库
// ==========================================

use crate::domain::book::Book;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use std::sync::{Arc, Mutex};

const BOOK_COLUMNS: &str = r#"
    id, title, author, isbn, genre, publication_year,
    total_copies, available_copies, branch_id, created_at, updated_at
"#;

pub struct BookRepository {
    conn: Arc<Mutex<Connection>>,
}

impl BookRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert(&self, book: &Book) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO books (
                id, title, author, isbn, genre, publication_year,
                total_copies, available_copies, branch_id, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                book.id,
                book.title,
                book.author,
                book.isbn,
                book.genre,
                book.publication_year,
                book.total_copies,
                book.available_copies,
                book.branch_id,
                book.created_at,
                book.updated_at,
            ],
        )?;
        Ok(())
    }

    pub fn find_by_id(&self, book_id: &str) -> RepositoryResult<Option<Book>> {
        let conn = self.get_conn()?;
        Self::find_by_id_tx(&conn, book_id)
    }

    /// 事务内按ID查询
    pub fn find_by_id_tx(conn: &Connection, book_id: &str) -> RepositoryResult<Option<Book>> {
        let sql = format!("SELECT {} FROM books WHERE id = ?1", BOOK_COLUMNS);
        let book = conn
            .query_row(&sql, params![book_id], map_book_row)
            .optional()?;
        Ok(book)
    }

    /// 事务内写回可借副本数
    pub fn update_available_copies_tx(
        tx: &Transaction,
        book_id: &str,
        available_copies: i64,
        updated_at: DateTime<Utc>,
    ) -> RepositoryResult<()> {
        let rows = tx.execute(
            "UPDATE books SET available_copies = ?1, updated_at = ?2 WHERE id = ?3",
            params![available_copies, updated_at, book_id],
        )?;
        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Book".to_string(),
                id: book_id.to_string(),
            });
        }
        Ok(())
    }
}

fn map_book_row(row: &Row<'_>) -> rusqlite::Result<Book> {
    Ok(Book {
        id: row.get(0)?,
        title: row.get(1)?,
        author: row.get(2)?,
        isbn: row.get(3)?,
        genre: row.get(4)?,
        publication_year: row.get(5)?,
        total_copies: row.get(6)?,
        available_copies: row.get(7)?,
        branch_id: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}
