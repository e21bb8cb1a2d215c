//! Plain Boundary Tests
//!
//! Operations that run outside any transaction, alone or nested in one.

use crate::*;

#[test]
fn test_save_without_boundary_is_immediate() {
    let db = Database::ephemeral();
    let mut session = db.session();

    let record = session.save("John Doe").unwrap();

    assert_eq!(db.get(record.id).unwrap().name, "John Doe");
    assert!(session.completed().is_empty());
}

#[test]
fn test_plain_write_is_visible_before_caller_returns() {
    let db = Database::ephemeral();
    let mut session = db.session();

    session
        .run_transactional(|s| {
            s.run_plain(|p| {
                assert!(!p.in_transaction());
                p.save("plain")
            })?;
            assert_eq!(db.len(), 1);
            s.save("tx")
        })
        .unwrap();

    assert_eq!(committed_names(&db), ["plain", "tx"]);
}

#[test]
fn test_plain_write_survives_enclosing_rollback() {
    let db = Database::ephemeral();
    let mut session = db.session();

    let err = session
        .run_transactional(|s| -> Result<()> {
            s.save("tx")?;
            s.run_plain(|p| p.save("plain"))?;
            Err(rollback_test())
        })
        .unwrap_err();

    assert!(err.is_operation_failed());
    assert_eq!(committed_names(&db), ["plain"]);
}

#[test]
fn test_caught_plain_error_does_not_poison() {
    let db = Database::ephemeral();
    let mut session = db.session();

    let saved = session
        .run_transactional(|s| {
            let first = s.save("first")?;
            let failed: Result<Record> = s.run_plain(|p| {
                p.save("second")?;
                Err(rollback_test())
            });
            assert!(failed.is_err());
            assert!(!s.current().unwrap().is_rollback_only());
            Ok(first)
        })
        .unwrap();

    assert_eq!(saved.name, "first");
    assert_eq!(db.len(), 2);
    assert!(session.last_completed().unwrap().is_committed());
}

#[test]
fn test_uncaught_plain_error_rolls_back_caller() {
    let db = Database::ephemeral();
    let mut session = db.session();

    let err = session
        .run_transactional(|s| {
            s.save("tx")?;
            s.run_plain(|p| -> Result<Record> {
                p.save("plain")?;
                Err(rollback_test())
            })
        })
        .unwrap_err();

    // the caller's own exit raised it, so it is the original error
    assert!(err.is_operation_failed());
    assert_eq!(committed_names(&db), ["plain"]);
}

#[test]
fn test_transaction_inside_plain_is_independent() {
    let db = Database::ephemeral();
    let mut session = db.session();

    let _ = session.run_transactional(|s| -> Result<()> {
        s.save("outer")?;
        s.run_plain(|p| p.run_transactional(|t| t.save("independent")))?;
        Err(rollback_test())
    });

    assert_eq!(committed_names(&db), ["independent"]);
    let states: Vec<_> = session.completed().iter().map(|t| t.state).collect();
    assert_eq!(
        states,
        [TransactionState::Committed, TransactionState::RolledBack]
    );
    assert_ne!(session.completed()[0].txn_id, session.completed()[1].txn_id);
}

#[test]
fn test_plain_service_keeps_session_id() {
    let db = Database::ephemeral();
    let mut session = db.session();
    let id = session.id();

    session
        .run(Demarcation::Plain, |p| {
            assert_eq!(p.id(), id);
            Ok(())
        })
        .unwrap();
}
