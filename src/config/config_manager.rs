// ==========================================
// 图书馆借阅系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::lending_config_trait::{
    LendingConfigReader, DEFAULT_LATE_FEE_PER_DAY, DEFAULT_LOAN_PERIOD_DAYS,
    DEFAULT_MAX_ACTIVE_LOANS, DEFAULT_OVERDUE_SWEEP_INTERVAL_SECS, MAX_LOAN_PERIOD_DAYS,
};
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::Display;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 写入 global scope 的配置值（存在则覆盖）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        tracing::info!(config_key = key, value = value, "配置已更新");
        Ok(())
    }

    /// 获取所有 global 配置的快照（JSON格式）
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let mut config_map: HashMap<String, String> = HashMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }

    /// 读取数值配置：缺失用默认值；格式错误或越界时告警并用默认值
    fn get_number_or_default<T>(
        &self,
        key: &str,
        default: T,
        is_valid: impl Fn(&T) -> bool,
    ) -> Result<T, Box<dyn Error>>
    where
        T: FromStr + Display + Copy,
    {
        let raw = match self.get_config_value(key)? {
            Some(v) => v,
            None => return Ok(default),
        };

        match raw.trim().parse::<T>() {
            Ok(v) if is_valid(&v) => Ok(v),
            _ => {
                tracing::warn!(
                    config_key = key,
                    raw_value = %raw,
                    default = %default,
                    "配置值无效，使用默认值"
                );
                Ok(default)
            }
        }
    }
}

// ==========================================
// LendingConfigReader Trait 实现
// ==========================================
impl LendingConfigReader for ConfigManager {
    fn get_loan_period_days(&self) -> Result<i64, Box<dyn Error>> {
        self.get_number_or_default(config_keys::LOAN_PERIOD_DAYS, DEFAULT_LOAN_PERIOD_DAYS, |v| {
            *v > 0 && *v <= MAX_LOAN_PERIOD_DAYS
        })
    }

    fn get_late_fee_per_day(&self) -> Result<f64, Box<dyn Error>> {
        self.get_number_or_default(config_keys::LATE_FEE_PER_DAY, DEFAULT_LATE_FEE_PER_DAY, |v| {
            v.is_finite() && *v >= 0.0
        })
    }

    fn get_max_active_loans(&self) -> Result<i64, Box<dyn Error>> {
        self.get_number_or_default(config_keys::MAX_ACTIVE_LOANS, DEFAULT_MAX_ACTIVE_LOANS, |v| {
            *v > 0
        })
    }

    fn get_overdue_sweep_interval_secs(&self) -> Result<u64, Box<dyn Error>> {
        self.get_number_or_default(
            config_keys::OVERDUE_SWEEP_INTERVAL_SECS,
            DEFAULT_OVERDUE_SWEEP_INTERVAL_SECS,
            |v| *v > 0,
        )
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 借期
    pub const LOAN_PERIOD_DAYS: &str = "loan_period_days";

    // 滞纳金
    pub const LATE_FEE_PER_DAY: &str = "late_fee_per_day";

    // 在借上限
    pub const MAX_ACTIVE_LOANS: &str = "max_active_loans";

    // 逾期扫描
    pub const OVERDUE_SWEEP_INTERVAL_SECS: &str = "overdue_sweep_interval_secs";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::lending_config_trait::LendingPolicy;

    fn setup_manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::init_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[test]
    fn test_defaults_when_config_absent() {
        let manager = setup_manager();
        assert_eq!(manager.load_policy(), LendingPolicy::default());
    }

    #[test]
    fn test_overrides_are_read() {
        let manager = setup_manager();
        manager
            .set_global_config_value(config_keys::MAX_ACTIVE_LOANS, "3")
            .unwrap();
        manager
            .set_global_config_value(config_keys::LATE_FEE_PER_DAY, "0.5")
            .unwrap();

        let policy = manager.load_policy();
        assert_eq!(policy.max_active_loans, 3);
        assert_eq!(policy.late_fee_per_day, 0.5);
        assert_eq!(policy.loan_period_days, DEFAULT_LOAN_PERIOD_DAYS);
    }

    #[test]
    fn test_invalid_values_fall_back_to_default() {
        let manager = setup_manager();
        manager
            .set_global_config_value(config_keys::LOAN_PERIOD_DAYS, "abc")
            .unwrap();
        manager
            .set_global_config_value(config_keys::LATE_FEE_PER_DAY, "-2")
            .unwrap();

        assert_eq!(manager.get_loan_period_days().unwrap(), DEFAULT_LOAN_PERIOD_DAYS);
        assert_eq!(manager.get_late_fee_per_day().unwrap(), DEFAULT_LATE_FEE_PER_DAY);
    }

    #[test]
    fn test_loan_period_upper_bound() {
        let manager = setup_manager();
        manager
            .set_global_config_value(config_keys::LOAN_PERIOD_DAYS, "100000000")
            .unwrap();
        assert_eq!(manager.get_loan_period_days().unwrap(), DEFAULT_LOAN_PERIOD_DAYS);

        manager
            .set_global_config_value(
                config_keys::LOAN_PERIOD_DAYS,
                &MAX_LOAN_PERIOD_DAYS.to_string(),
            )
            .unwrap();
        assert_eq!(manager.get_loan_period_days().unwrap(), MAX_LOAN_PERIOD_DAYS);
    }

    #[test]
    fn test_snapshot_contains_overrides() {
        let manager = setup_manager();
        manager
            .set_global_config_value(config_keys::LOAN_PERIOD_DAYS, "21")
            .unwrap();

        let snapshot: HashMap<String, String> =
            serde_json::from_str(&manager.get_config_snapshot().unwrap()).unwrap();
        assert_eq!(snapshot.get("loan_period_days").map(String::as_str), Some("21"));
    }
}
