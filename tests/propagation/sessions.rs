//! Session Isolation Tests
//!
//! Contexts never leak between sequential calls, sessions or threads.

use crate::*;

#[test]
fn test_sequential_calls_get_fresh_contexts() {
    let db = Database::ephemeral();
    let mut session = db.session();

    let first = session.run_transactional(|s| -> Result<()> {
        s.save("doomed")?;
        s.set_rollback_only()
    });
    assert!(first.unwrap_err().is_unexpected_rollback());

    session
        .run_transactional(|s| {
            let ctx = s.current().unwrap();
            assert!(!ctx.is_rollback_only());
            assert_eq!(ctx.depth(), 1);
            assert!(ctx.pending_writes().is_empty());
            s.save("fine")
        })
        .unwrap();

    let completed = session.completed();
    assert_eq!(completed.len(), 2);
    assert!(completed[0].txn_id < completed[1].txn_id);
    assert_eq!(committed_names(&db), ["fine"]);
}

#[test]
fn test_sessions_do_not_share_context() {
    let db = Database::ephemeral();
    let mut a = db.session();
    let mut b = db.session();
    assert_ne!(a.id(), b.id());

    let err = a
        .run_transactional(|s| -> Result<()> {
            s.save("a")?;
            // b has no transaction: its save is durable right away
            assert!(!b.in_transaction());
            b.save("b")?;
            Err(rollback_test())
        })
        .unwrap_err();

    assert!(err.is_operation_failed());
    assert_eq!(committed_names(&db), ["b"]);
    assert!(b.completed().is_empty());
}

#[test]
fn test_concurrent_sessions_commit_independently() {
    let db = Database::ephemeral();
    let threads = 4;
    let per_thread = 25;

    std::thread::scope(|scope| {
        for t in 0..threads {
            let db = &db;
            scope.spawn(move || {
                let mut session = db.session();
                for i in 0..per_thread {
                    let result = session.run_transactional(|s| -> Result<()> {
                        s.save(&format!("t{}-{}", t, i))?;
                        if i % 5 == 0 {
                            return Err(rollback_test());
                        }
                        s.run_transactional(|inner| inner.save(&format!("t{}-{}-nested", t, i)))?;
                        Ok(())
                    });
                    assert_eq!(result.is_ok(), i % 5 != 0);
                }
            });
        }
    });

    let committed_per_thread = (0..per_thread).filter(|i| i % 5 != 0).count();
    assert_eq!(db.len(), threads * committed_per_thread * 2);

    let metrics = db.metrics();
    assert_eq!(
        metrics.transactions_committed,
        (threads * committed_per_thread) as u64
    );
    assert_eq!(
        metrics.transactions_rolled_back,
        (threads * (per_thread - committed_per_thread)) as u64
    );
    assert_eq!(metrics.joined_boundaries, (threads * committed_per_thread) as u64);
}
