// ==========================================
// 并发控制测试
// ==========================================
// 职责: 验证并发写入下的状态机与台账约束
// 1. 同一借阅的两个竞争转换只有一个成功
// 2. 并发创建不会越过在借上限
// 3. 最后一本副本只能被借出一次
// ==========================================

mod helpers;

use std::sync::{Arc, Barrier};
use std::thread;

use library_lending::api::ApiError;
use library_lending::domain::types::LoanStatus;

use helpers::api_test_helper::LendingTestEnv;

#[test]
fn test_concurrent_借出与取消竞争() {
    let env = LendingTestEnv::new().expect("无法创建测试环境");
    let (_, member) = env.member("race@library.com");
    let librarian = env.librarian("desk@library.com");
    let admin = env.admin("root@library.com");
    let branch = env.branch("Central");
    let book = env.book(&branch, "978-0000000200", 2, 2);

    let loan = env.request_loan(&member, &book).unwrap();
    env.loan_api
        .change_status(&loan.id, LoanStatus::Approved, Some(&librarian), None)
        .unwrap();

    let barrier = Arc::new(Barrier::new(2));
    let mut handles = Vec::new();
    for (target, actor) in [
        (LoanStatus::Borrowed, librarian.clone()),
        (LoanStatus::Canceled, admin.clone()),
    ] {
        let loan_api = env.loan_api.clone();
        let barrier = barrier.clone();
        let loan_id = loan.id.clone();
        handles.push(thread::spawn(move || {
            barrier.wait();
            loan_api.change_status(&loan_id, target, Some(&actor), None)
        }));
    }

    let results: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().expect("线程异常"))
        .collect();

    let winners: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(winners.len(), 1, "只应有一个转换成功: {:?}", results);

    let loser = results
        .iter()
        .find_map(|r| r.as_ref().err())
        .expect("应有一个失败");
    assert!(
        matches!(loser, ApiError::InvalidTransition { from, .. } if *from == winners[0].status),
        "失败方应看到胜出后的状态: {:?}",
        loser
    );

    let expected_available = match winners[0].status {
        LoanStatus::Borrowed => 1,
        _ => 2,
    };
    assert_eq!(env.available_copies(&book.id), expected_available);
    assert_eq!(env.history_len(&loan.id), 3);
}

#[test]
fn test_concurrent_创建不越过上限() {
    let env = LendingTestEnv::new().expect("无法创建测试环境");
    let (_, member) = env.member("burst@library.com");
    let branch = env.branch("Central");
    let book = env.book(&branch, "978-0000000201", 20, 20);

    let threads = 10;
    let barrier = Arc::new(Barrier::new(threads));
    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let loan_api = env.loan_api.clone();
            let barrier = barrier.clone();
            let member = member.clone();
            let book_id = book.id.clone();
            let branch_id = branch.id.clone();
            thread::spawn(move || {
                barrier.wait();
                loan_api.create_loan(&member, &book_id, &branch_id, None)
            })
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().expect("线程异常"))
        .collect();

    let ok = results.iter().filter(|r| r.is_ok()).count();
    let limited = results
        .iter()
        .filter(|r| matches!(r, Err(ApiError::LoanLimitExceeded { .. })))
        .count();

    assert_eq!(ok, 5);
    assert_eq!(limited, threads - 5);
    assert_eq!(env.loan_api.my_history(&member).unwrap().len(), 5);
}

#[test]
fn test_concurrent_最后一本只借出一次() {
    let env = LendingTestEnv::new().expect("无法创建测试环境");
    let (_, alice) = env.member("alice@library.com");
    let (_, bob) = env.member("bob@library.com");
    let librarian = env.librarian("desk@library.com");
    let branch = env.branch("Central");
    let book = env.book(&branch, "978-0000000202", 1, 1);

    let mut loan_ids = Vec::new();
    for member in [&alice, &bob] {
        let loan = env.request_loan(member, &book).unwrap();
        env.loan_api
            .change_status(&loan.id, LoanStatus::Approved, Some(&librarian), None)
            .unwrap();
        loan_ids.push(loan.id);
    }

    let barrier = Arc::new(Barrier::new(loan_ids.len()));
    let handles: Vec<_> = loan_ids
        .iter()
        .cloned()
        .map(|loan_id| {
            let loan_api = env.loan_api.clone();
            let barrier = barrier.clone();
            let librarian = librarian.clone();
            thread::spawn(move || {
                barrier.wait();
                loan_api.change_status(&loan_id, LoanStatus::Borrowed, Some(&librarian), None)
            })
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().expect("线程异常"))
        .collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert_eq!(
        results
            .iter()
            .filter(|r| matches!(r, Err(ApiError::OutOfStock(_))))
            .count(),
        1
    );
    assert_eq!(env.available_copies(&book.id), 0);

    let statuses: Vec<_> = loan_ids.iter().map(|id| env.loan(id).status).collect();
    assert!(statuses.contains(&LoanStatus::Borrowed));
    assert!(statuses.contains(&LoanStatus::Approved));
}
