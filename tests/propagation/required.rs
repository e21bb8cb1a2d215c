//! Transactional Boundary Tests
//!
//! Joining, commit on clean exit, rollback on error, rollback-only veto.

use crate::*;

// =============================================================================
// COMMIT
// =============================================================================

#[test]
fn test_leaf_operation_commits() {
    let db = Database::ephemeral();
    let mut session = db.session();

    let record = session.run_transactional(|s| s.save("John Doe")).unwrap();

    assert_eq!(db.get(record.id).unwrap(), record);
    let summary = session.last_completed().unwrap();
    assert_eq!(summary.state, TransactionState::Committed);
    assert_eq!(summary.writes, 1);
    assert!(!session.in_transaction());
}

#[test]
fn test_writes_are_invisible_until_commit() {
    let db = Database::ephemeral();
    let mut session = db.session();

    session
        .run_transactional(|s| {
            let record = s.save("pending")?;
            assert_eq!(db.len(), 0);
            assert_eq!(s.find(record.id)?, Some(record.clone()));
            assert!(db.get(record.id).unwrap_err().is_not_found());
            Ok(())
        })
        .unwrap();

    assert_eq!(committed_names(&db), ["pending"]);
}

#[test]
fn test_nested_boundaries_share_one_context() {
    let db = Database::ephemeral();
    let mut session = db.session();

    session
        .run_transactional(|s| {
            let outer = s.current().unwrap().txn_id;
            s.save("outer")?;
            s.run_transactional(|inner| {
                let ctx = inner.current().unwrap();
                assert_eq!(ctx.txn_id, outer);
                assert_eq!(ctx.depth(), 2);
                inner.save("inner")
            })?;
            assert_eq!(s.current().unwrap().depth(), 1);
            Ok(())
        })
        .unwrap();

    assert_eq!(session.completed().len(), 1);
    assert_eq!(session.completed()[0].writes, 2);
    assert_eq!(committed_names(&db), ["outer", "inner"]);
    assert_eq!(db.metrics().joined_boundaries, 1);
}

#[test]
fn test_run_dispatches_on_demarcation() {
    let db = Database::ephemeral();
    let mut session = db.session();

    session
        .run(Demarcation::Transactional, |s| {
            assert!(s.in_transaction());
            s.save("x")
        })
        .unwrap();

    assert!(session.last_completed().unwrap().is_committed());
}

// =============================================================================
// ROLLBACK
// =============================================================================

#[test]
fn test_error_at_depth_three_rolls_back_everything() {
    let db = Database::ephemeral();
    let mut session = db.session();

    let err = session
        .run_transactional(|s| {
            s.save("level-1")?;
            s.run_transactional(|s| {
                s.save("level-2")?;
                s.run_transactional(|s| -> Result<()> {
                    s.save("level-3")?;
                    Err(rollback_test())
                })
            })
        })
        .unwrap_err();

    assert!(err.is_operation_failed());
    assert_eq!(err.to_string(), "operation failed: rollback test");
    assert!(db.is_empty());
    let summary = session.last_completed().unwrap();
    assert_eq!(summary.state, TransactionState::RolledBack);
    assert!(summary.rollback_only);
    assert_eq!(summary.writes, 3);
}

#[test]
fn test_outer_error_after_nested_success_keeps_original_error() {
    let db = Database::ephemeral();
    let mut session = db.session();

    let err = session
        .run_transactional(|s| -> Result<()> {
            s.save("a")?;
            s.run_transactional(|inner| inner.save("b"))?;
            Err(rollback_test())
        })
        .unwrap_err();

    assert!(err.is_operation_failed());
    assert!(db.is_empty());
    // nothing below the outermost level failed
    assert!(!session.last_completed().unwrap().rollback_only);
}

#[test]
fn test_rolled_back_ids_are_not_reused() {
    let db = Database::ephemeral();
    let mut session = db.session();

    let _ = session.run_transactional(|s| -> Result<()> {
        s.save("lost")?;
        Err(rollback_test())
    });
    let kept = session.run_transactional(|s| s.save("kept")).unwrap();

    assert_eq!(kept.id.as_u64(), 2);
    assert_eq!(db.records().len(), 1);
}

// =============================================================================
// ROLLBACK-ONLY
// =============================================================================

#[test]
fn test_swallowed_inner_error_is_unexpected_rollback() {
    let db = Database::ephemeral();
    let mut session = db.session();

    let err = session
        .run_transactional(|s| {
            s.save("a")?;
            let inner: Result<Record> = s.run_transactional(|inner| {
                inner.save("b")?;
                Err(rollback_test())
            });
            assert!(inner.unwrap_err().is_operation_failed());
            assert!(s.current().unwrap().is_rollback_only());
            Ok(())
        })
        .unwrap_err();

    let summary = session.last_completed().unwrap();
    match err {
        Error::UnexpectedRollback { txn_id } => assert_eq!(txn_id, summary.txn_id),
        other => panic!("expected UnexpectedRollback, got {:?}", other),
    }
    assert!(db.is_empty());
    assert_eq!(db.metrics().unexpected_rollbacks, 1);
}

#[test]
fn test_set_rollback_only_vetoes_commit() {
    let db = Database::ephemeral();
    let mut session = db.session();

    let err = session
        .run_transactional(|s| {
            s.save("a")?;
            s.set_rollback_only()
        })
        .unwrap_err();

    assert!(err.is_unexpected_rollback());
    assert!(db.is_empty());
}

#[test]
fn test_set_rollback_only_needs_a_transaction() {
    let db = Database::ephemeral();
    let mut session = db.session();

    let err = session.set_rollback_only().unwrap_err();
    assert!(matches!(err, Error::InvalidState(_)));
}

// =============================================================================
// DECLARATIVE SERVICES
// =============================================================================

struct Ledger;

impl Demarcated for Ledger {
    const DEMARCATION: Demarcation = Demarcation::Transactional;
}

impl Ledger {
    fn book(&self, session: &mut Session<'_>, names: &[&str]) -> Result<Vec<Record>> {
        self.within(session, |s| names.iter().map(|name| s.save(name)).collect())
    }
}

#[test]
fn test_demarcated_service_joins_caller() {
    let db = Database::ephemeral();
    let mut session = db.session();

    let err = session
        .run_transactional(|s| -> Result<()> {
            Ledger.book(s, &["a", "b"])?;
            Ledger.book(s, &["c", " "])?;
            Ok(())
        })
        .unwrap_err();

    assert!(matches!(err, Error::ConstraintViolation(_)));
    assert!(db.is_empty());
    assert_eq!(session.completed().len(), 1);
}
