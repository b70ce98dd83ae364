// ==========================================
// 图书馆借阅系统 - 滞纳金计算
// ==========================================
// 纯函数: 只依赖应还日期与当前日期（UTC 日期部分）
// ==========================================

use chrono::{DateTime, NaiveDate, Utc};

/// 每逾期一天的滞纳金（货币单位）
pub const LATE_FEE_PER_DAY: f64 = 1.0;

/// 逾期天数；应还日期在今天或之后则为 0
pub fn days_overdue(due_date: DateTime<Utc>, today: NaiveDate) -> i64 {
    let due_day = due_date.date_naive();
    if today <= due_day {
        0
    } else {
        (today - due_day).num_days()
    }
}

/// 计算滞纳金 = 逾期天数 * 每日费率
pub fn calculate_late_fee(due_date: DateTime<Utc>, today: NaiveDate, fee_per_day: f64) -> f64 {
    days_overdue(due_date, today) as f64 * fee_per_day
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    #[test]
    fn test_not_yet_due_is_free() {
        let due = Utc.with_ymd_and_hms(2026, 3, 20, 8, 0, 0).unwrap();
        assert_eq!(calculate_late_fee(due, today(), LATE_FEE_PER_DAY), 0.0);
    }

    #[test]
    fn test_due_today_is_free() {
        // 当天 23:59 到期，日期部分等于今天
        let due = Utc.with_ymd_and_hms(2026, 3, 10, 23, 59, 0).unwrap();
        assert_eq!(days_overdue(due, today()), 0);
    }

    #[test]
    fn test_three_days_overdue() {
        let due = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap() - Duration::days(3);
        assert_eq!(days_overdue(due, today()), 3);
        assert_eq!(calculate_late_fee(due, today(), LATE_FEE_PER_DAY), 3.0);
        assert_eq!(calculate_late_fee(due, today(), 0.5), 1.5);
    }
}
