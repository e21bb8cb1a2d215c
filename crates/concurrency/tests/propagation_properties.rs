//! Property tests for nested propagation
//!
//! A chain of `depth` transactional levels, each saving one record and
//! calling the next. One level fails; optionally one shallower level swallows
//! the failure of the level below it.

use proptest::prelude::*;
use txprop_concurrency::{PropagationManager, Session};
use txprop_core::{Error, Result, TransactionState};

fn level(
    session: &mut Session<'_>,
    current: usize,
    depth: usize,
    fail_at: usize,
    catch_at: Option<usize>,
) -> Result<()> {
    session.run_transactional(|s| {
        s.save(&format!("level-{}", current))?;
        if current < depth {
            let nested = level(s, current + 1, depth, fail_at, catch_at);
            if catch_at != Some(current) {
                nested?;
            }
        }
        if current == fail_at {
            return Err(Error::operation_failed("rollback test"));
        }
        Ok(())
    })
}

fn chain() -> impl Strategy<Value = (usize, usize, Option<usize>)> {
    (1usize..8).prop_flat_map(|depth| {
        (1..=depth).prop_flat_map(move |fail_at| {
            let catch = if fail_at > 1 {
                prop::option::of(1..fail_at).boxed()
            } else {
                Just(None).boxed()
            };
            (Just(depth), Just(fail_at), catch)
        })
    })
}

proptest! {
    #[test]
    fn prop_single_failure_rolls_back_whole_chain((depth, fail_at, catch_at) in chain()) {
        let manager = PropagationManager::default();
        let mut session = manager.session();

        let err = level(&mut session, 1, depth, fail_at, catch_at).unwrap_err();

        match catch_at {
            None => prop_assert!(err.is_operation_failed()),
            Some(_) => prop_assert!(err.is_unexpected_rollback()),
        }
        prop_assert!(manager.store().is_empty());
        prop_assert!(!session.in_transaction());
        prop_assert_eq!(session.completed().len(), 1);
        prop_assert_eq!(session.completed()[0].state, TransactionState::RolledBack);
        prop_assert_eq!(session.completed()[0].writes, depth);
    }

    #[test]
    fn prop_clean_chain_commits_every_level(depth in 1usize..8) {
        let manager = PropagationManager::default();
        let mut session = manager.session();

        // fail_at beyond the chain: nobody fails
        level(&mut session, 1, depth, depth + 1, None).unwrap();

        prop_assert_eq!(manager.store().len(), depth);
        prop_assert!(session.last_completed().unwrap().is_committed());
        prop_assert_eq!(manager.stats().joined, depth as u64 - 1);
    }

    #[test]
    fn prop_rollback_only_never_leaks(poison in prop::collection::vec(any::<bool>(), 1..10)) {
        let manager = PropagationManager::default();
        let mut session = manager.session();

        for &poisoned in &poison {
            let _ = session.run_transactional(|s| {
                s.save("x")?;
                if poisoned {
                    s.set_rollback_only()?;
                }
                Ok(())
            });
        }

        let completed = session.completed();
        prop_assert_eq!(completed.len(), poison.len());
        for (summary, &poisoned) in completed.iter().zip(&poison) {
            prop_assert_eq!(summary.rollback_only, poisoned);
            prop_assert_eq!(summary.is_committed(), !poisoned);
        }
        let committed = poison.iter().filter(|p| !**p).count();
        prop_assert_eq!(manager.store().len(), committed);
    }

    #[test]
    fn prop_plain_writes_survive_rollback(plain_writes in 0usize..6) {
        let manager = PropagationManager::default();
        let mut session = manager.session();

        let result: Result<()> = session.run_transactional(|s| {
            s.save("tx")?;
            for i in 0..plain_writes {
                s.run_plain(|p| p.save(&format!("plain-{}", i)))?;
            }
            Err(Error::operation_failed("rollback test"))
        });

        prop_assert!(result.is_err());
        prop_assert_eq!(manager.store().len(), plain_writes);
    }
}
