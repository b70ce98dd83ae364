// ==========================================
// 图书馆借阅系统 - 库存台账
// ==========================================
// 职责: 维护 0 <= available_copies <= total_copies
// 红线: 只作为借阅状态转换的副作用调用,且与状态写入同一事务
// ==========================================

use chrono::{DateTime, Utc};

use crate::domain::book::Book;
use crate::engine::transition::TransitionError;

/// 台账变动方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerEffect {
    /// 借出: 可借副本 -1
    Decrement,
    /// 归还: 可借副本 +1
    Increment,
}

// ==========================================
// InventoryLedger
// ==========================================
pub struct InventoryLedger;

impl InventoryLedger {
    /// 借出一本
    ///
    /// # 返回
    /// - `Ok(available)`: 更新后的可借副本数
    /// - `Err(OutOfStock)`: 可借副本为 0，book 不变
    pub fn decrement(book: &mut Book, now: DateTime<Utc>) -> Result<i64, TransitionError> {
        if book.available_copies <= 0 {
            return Err(TransitionError::OutOfStock {
                book_id: book.id.clone(),
            });
        }
        book.available_copies -= 1;
        book.updated_at = now;
        Ok(book.available_copies)
    }

    /// 归还一本
    ///
    /// 调用方保证此前已 decrement，这里不做上限校验
    pub fn increment(book: &mut Book, now: DateTime<Utc>) -> i64 {
        book.available_copies += 1;
        book.updated_at = now;
        book.available_copies
    }

    /// 按方向应用变动
    pub fn apply(
        book: &mut Book,
        effect: LedgerEffect,
        now: DateTime<Utc>,
    ) -> Result<i64, TransitionError> {
        match effect {
            LedgerEffect::Decrement => Self::decrement(book, now),
            LedgerEffect::Increment => Ok(Self::increment(book, now)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decrement_until_out_of_stock() {
        let now = Utc::now();
        let mut book = Book::new("Dune", "978-0441013593", "br1", 2);

        assert_eq!(InventoryLedger::decrement(&mut book, now).unwrap(), 1);
        assert_eq!(InventoryLedger::decrement(&mut book, now).unwrap(), 0);

        let err = InventoryLedger::decrement(&mut book, now).unwrap_err();
        assert!(matches!(err, TransitionError::OutOfStock { .. }));
        assert_eq!(book.available_copies, 0);
        assert!(book.ledger_is_consistent());
    }

    #[test]
    fn test_increment_restores_copy() {
        let now = Utc::now();
        let mut book = Book::new("Dune", "978-0441013593", "br1", 1);

        InventoryLedger::apply(&mut book, LedgerEffect::Decrement, now).unwrap();
        let available = InventoryLedger::apply(&mut book, LedgerEffect::Increment, now).unwrap();

        assert_eq!(available, 1);
        assert!(book.ledger_is_consistent());
    }
}
