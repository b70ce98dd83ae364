// ==========================================
// 图书馆借阅系统 - 用户数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::user::User;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

const USER_COLUMNS: &str =
    "id, email, full_name, role, is_active, is_blocked, created_at, updated_at";

// ==========================================
// UserRepository - 用户仓储
// ==========================================
pub struct UserRepository {
    conn: Arc<Mutex<Connection>>,
}

impl UserRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入用户（email 重复时返回 UniqueConstraintViolation）
    pub fn insert(&self, user: &User) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO users (
                id, email, full_name, role, is_active, is_blocked, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                user.id,
                user.email,
                user.full_name,
                user.role,
                user.is_active,
                user.is_blocked,
                user.created_at,
                user.updated_at,
            ],
        )?;
        Ok(())
    }

    pub fn find_by_id(&self, user_id: &str) -> RepositoryResult<Option<User>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS);
        let user = conn
            .query_row(&sql, params![user_id], map_user_row)
            .optional()?;
        Ok(user)
    }

    pub fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM users WHERE email = ?1", USER_COLUMNS);
        let user = conn
            .query_row(&sql, params![email], map_user_row)
            .optional()?;
        Ok(user)
    }

    /// 更新启用/封禁标志
    pub fn update_flags(
        &self,
        user_id: &str,
        is_active: bool,
        is_blocked: bool,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "UPDATE users SET is_active = ?1, is_blocked = ?2, updated_at = ?3 WHERE id = ?4",
            params![is_active, is_blocked, Utc::now(), user_id],
        )?;
        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "User".to_string(),
                id: user_id.to_string(),
            });
        }
        Ok(())
    }
}

fn map_user_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        full_name: row.get(2)?,
        role: row.get(3)?,
        is_active: row.get(4)?,
        is_blocked: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::UserRole;

    fn setup_repo() -> UserRepository {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::init_schema(&conn).unwrap();
        UserRepository::new(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn test_insert_and_find() {
        let repo = setup_repo();
        let user = User::new("reader@library.com", Some("Reader".to_string()), UserRole::Member);
        repo.insert(&user).unwrap();

        let by_id = repo.find_by_id(&user.id).unwrap().unwrap();
        assert_eq!(by_id.email, "reader@library.com");
        assert_eq!(by_id.role, UserRole::Member);

        let by_email = repo.find_by_email("reader@library.com").unwrap().unwrap();
        assert_eq!(by_email.id, user.id);

        assert!(repo.find_by_id("missing").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_email_is_unique_violation() {
        let repo = setup_repo();
        repo.insert(&User::new("dup@library.com", None, UserRole::Member))
            .unwrap();

        let err = repo
            .insert(&User::new("dup@library.com", None, UserRole::Librarian))
            .unwrap_err();
        assert!(matches!(err, RepositoryError::UniqueConstraintViolation(_)));
    }

    #[test]
    fn test_update_flags() {
        let repo = setup_repo();
        let user = User::new("flag@library.com", None, UserRole::Member);
        repo.insert(&user).unwrap();

        repo.update_flags(&user.id, true, true).unwrap();
        let found = repo.find_by_id(&user.id).unwrap().unwrap();
        assert!(found.is_blocked);
        assert!(!found.can_act());

        let err = repo.update_flags("missing", true, false).unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }));
    }
}
