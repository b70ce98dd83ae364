// ==========================================
// 图书馆借阅系统 - 枚举与 SQLite 的映射
// ==========================================
// 存储格式: SCREAMING_SNAKE_CASE 文本
// ==========================================

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};

use crate::domain::types::{LoanStatus, UserRole};

impl ToSql for LoanStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.to_db_str()))
    }
}

impl FromSql for LoanStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let raw = value.as_str()?;
        LoanStatus::parse(raw)
            .ok_or_else(|| FromSqlError::Other(format!("未知借阅状态: {}", raw).into()))
    }
}

impl ToSql for UserRole {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.to_db_str()))
    }
}

impl FromSql for UserRole {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let raw = value.as_str()?;
        UserRole::parse(raw)
            .ok_or_else(|| FromSqlError::Other(format!("未知用户角色: {}", raw).into()))
    }
}
