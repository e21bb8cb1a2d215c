//! Scenario catalog
//!
//! One scenario per entry point of the demo's REST controller. Each scenario
//! opens a fresh session (one request), runs its call chain, and reports what
//! the caller saw next to what the store kept.
//!
//! | Scenario | Persisted | Caller sees |
//! |----------|-----------|-------------|
//! | on-controller | 1 | Ok |
//! | on-controller-rollback1 | 1 | OperationFailed |
//! | on-non-transactional-service | 1 | Ok |
//! | on-non-transactional-service-rollback1 | 1 | OperationFailed |
//! | on-transactional-service | 1 | Ok |
//! | on-transactional-service-rollback1 | 0 | OperationFailed |
//! | create-user-twice | 2 | Ok |
//! | create-user-twice-within-error | 1 | OperationFailed |
//! | create-couple-of-users | 2 | Ok |
//! | create-couple-of-users-rollback1 | 0 | OperationFailed |
//! | create-couple-of-users-rollback2 | 0 | OperationFailed |
//! | create-couple-of-users-rollback3 | 0 | UnexpectedRollback |
//! | create-couple-of-users-rollback4 | 2 | Ok |

use crate::database::Database;
use crate::services::{
    AnotherTransactionalService, NonTransactionalUserService, TransactionalUserService,
};
use serde::Serialize;
use std::collections::BTreeSet;
use txprop_concurrency::TransactionSummary;
use txprop_core::{Error, Record, Result};

/// A demo request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scenario {
    /// Save at the controller with no boundary
    OnController,
    /// Save at the controller, then fail
    OnControllerRollback1,
    /// Plain service saves
    OnNonTransactionalService,
    /// Plain service saves, then fails
    OnNonTransactionalServiceRollback1,
    /// Transactional service saves
    OnTransactionalService,
    /// Transactional service saves, then fails
    OnTransactionalServiceRollback1,
    /// Two independent transactions
    CreateUserTwice,
    /// First transaction commits, controller fails before the second
    CreateUserTwiceWithinError,
    /// Nested transactional call joins the outer transaction
    CreateCoupleOfUsers,
    /// Outer level fails after the nested call succeeded
    CreateCoupleOfUsersRollback1,
    /// Nested level fails, error propagates
    CreateCoupleOfUsersRollback2,
    /// Nested level fails, outer level swallows the error
    CreateCoupleOfUsersRollback3,
    /// Nested plain call fails, outer level swallows the error
    CreateCoupleOfUsersRollback4,
}

/// What the caller is expected to observe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExpectedOutcome {
    /// The call returned normally
    Ok,
    /// The body's error came back unchanged
    OperationFailed,
    /// The rollback-only flag vetoed the commit
    UnexpectedRollback,
}

/// Expected records persisted and caller outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Expectation {
    /// Records durable after the request
    pub persisted: usize,
    /// What the caller sees
    pub outcome: ExpectedOutcome,
}

/// Error as reported to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportedError {
    /// `Error::kind()`
    pub kind: String,
    /// Display text
    pub message: String,
}

impl From<&Error> for ReportedError {
    fn from(err: &Error) -> Self {
        Self {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

/// Outcome of one scenario run
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    /// Which scenario ran
    pub scenario: Scenario,
    /// Name the users were derived from
    pub name: String,
    /// Records the call chain returned, if it returned normally
    pub returned: Vec<Record>,
    /// Error the caller saw, if any
    pub error: Option<ReportedError>,
    /// Transactions finalized during the request, oldest first
    pub transactions: Vec<TransactionSummary>,
    /// Records that became durable during the request
    pub persisted: Vec<Record>,
    /// What should have happened
    pub expectation: Expectation,
    /// Whether the observed outcome matches the expectation
    pub matches_expectation: bool,
}

impl Scenario {
    /// Every scenario, in catalog order
    pub const ALL: [Scenario; 13] = [
        Scenario::OnController,
        Scenario::OnControllerRollback1,
        Scenario::OnNonTransactionalService,
        Scenario::OnNonTransactionalServiceRollback1,
        Scenario::OnTransactionalService,
        Scenario::OnTransactionalServiceRollback1,
        Scenario::CreateUserTwice,
        Scenario::CreateUserTwiceWithinError,
        Scenario::CreateCoupleOfUsers,
        Scenario::CreateCoupleOfUsersRollback1,
        Scenario::CreateCoupleOfUsersRollback2,
        Scenario::CreateCoupleOfUsersRollback3,
        Scenario::CreateCoupleOfUsersRollback4,
    ];

    /// Kebab-case name used on the command line
    pub fn name(&self) -> &'static str {
        match self {
            Scenario::OnController => "on-controller",
            Scenario::OnControllerRollback1 => "on-controller-rollback1",
            Scenario::OnNonTransactionalService => "on-non-transactional-service",
            Scenario::OnNonTransactionalServiceRollback1 => {
                "on-non-transactional-service-rollback1"
            }
            Scenario::OnTransactionalService => "on-transactional-service",
            Scenario::OnTransactionalServiceRollback1 => "on-transactional-service-rollback1",
            Scenario::CreateUserTwice => "create-user-twice",
            Scenario::CreateUserTwiceWithinError => "create-user-twice-within-error",
            Scenario::CreateCoupleOfUsers => "create-couple-of-users",
            Scenario::CreateCoupleOfUsersRollback1 => "create-couple-of-users-rollback1",
            Scenario::CreateCoupleOfUsersRollback2 => "create-couple-of-users-rollback2",
            Scenario::CreateCoupleOfUsersRollback3 => "create-couple-of-users-rollback3",
            Scenario::CreateCoupleOfUsersRollback4 => "create-couple-of-users-rollback4",
        }
    }

    /// One-line description
    pub fn description(&self) -> &'static str {
        match self {
            Scenario::OnController => "save with no boundary; durable at once",
            Scenario::OnControllerRollback1 => {
                "save with no boundary, then fail; the save is already durable"
            }
            Scenario::OnNonTransactionalService => "plain service saves",
            Scenario::OnNonTransactionalServiceRollback1 => {
                "plain service saves then fails; nothing to roll back"
            }
            Scenario::OnTransactionalService => "transactional service saves and commits",
            Scenario::OnTransactionalServiceRollback1 => {
                "transactional service fails before commit; rolled back"
            }
            Scenario::CreateUserTwice => "two top-level transactions, each commits",
            Scenario::CreateUserTwiceWithinError => {
                "first transaction commits, failure before the second"
            }
            Scenario::CreateCoupleOfUsers => "nested service joins; one commit for both",
            Scenario::CreateCoupleOfUsersRollback1 => {
                "outer fails after nested success; both rolled back"
            }
            Scenario::CreateCoupleOfUsersRollback2 => {
                "nested service fails; error propagates, both rolled back"
            }
            Scenario::CreateCoupleOfUsersRollback3 => {
                "nested service fails, outer catches; rollback-only vetoes commit"
            }
            Scenario::CreateCoupleOfUsersRollback4 => {
                "nested plain service fails, outer catches; both persisted"
            }
        }
    }

    /// What the caller should observe
    pub fn expectation(&self) -> Expectation {
        use ExpectedOutcome::*;
        let (persisted, outcome) = match self {
            Scenario::OnController => (1, Ok),
            Scenario::OnControllerRollback1 => (1, OperationFailed),
            Scenario::OnNonTransactionalService => (1, Ok),
            Scenario::OnNonTransactionalServiceRollback1 => (1, OperationFailed),
            Scenario::OnTransactionalService => (1, Ok),
            Scenario::OnTransactionalServiceRollback1 => (0, OperationFailed),
            Scenario::CreateUserTwice => (2, Ok),
            Scenario::CreateUserTwiceWithinError => (1, OperationFailed),
            Scenario::CreateCoupleOfUsers => (2, Ok),
            Scenario::CreateCoupleOfUsersRollback1 => (0, OperationFailed),
            Scenario::CreateCoupleOfUsersRollback2 => (0, OperationFailed),
            Scenario::CreateCoupleOfUsersRollback3 => (0, UnexpectedRollback),
            Scenario::CreateCoupleOfUsersRollback4 => (2, Ok),
        };
        Expectation { persisted, outcome }
    }

    /// Run this scenario as one request against `db`
    pub fn run(&self, db: &Database, name: &str) -> ScenarioReport {
        let before: BTreeSet<_> = db.records().into_iter().map(|r| r.id).collect();
        let mut session = db.session();
        let _span = tracing::info_span!("scenario", scenario = self.name(), session = %session.id())
            .entered();

        let outcome = self.call(&mut session, name);
        let transactions = session.completed().to_vec();
        drop(session);

        let persisted: Vec<Record> = db
            .records()
            .into_iter()
            .filter(|r| !before.contains(&r.id))
            .collect();

        let expectation = self.expectation();
        let observed = match &outcome {
            Ok(_) => ExpectedOutcome::Ok,
            Err(err) if err.is_unexpected_rollback() => ExpectedOutcome::UnexpectedRollback,
            Err(_) => ExpectedOutcome::OperationFailed,
        };
        let matches_expectation = observed == expectation.outcome
            && persisted.len() == expectation.persisted
            && outcome.as_ref().err().map_or(true, |e| {
                e.is_unexpected_rollback() || e.is_operation_failed()
            });

        let (returned, error) = match outcome {
            Ok(records) => (records, None),
            Err(err) => (Vec::new(), Some(ReportedError::from(&err))),
        };

        ScenarioReport {
            scenario: *self,
            name: name.to_string(),
            returned,
            error,
            transactions,
            persisted,
            expectation,
            matches_expectation,
        }
    }

    /// The controller method: one session, the services, no boundary of its own
    fn call(&self, session: &mut txprop_concurrency::Session<'_>, name: &str) -> Result<Vec<Record>> {
        let non_transactional = NonTransactionalUserService;
        let transactional =
            TransactionalUserService::new(AnotherTransactionalService, NonTransactionalUserService);
        let first = format!("{}_1", name);
        let second = format!("{}_2", name);

        match self {
            Scenario::OnController => Ok(vec![session.save(name)?]),
            Scenario::OnControllerRollback1 => {
                session.save(name)?;
                Err(Error::operation_failed("rollback test"))
            }
            Scenario::OnNonTransactionalService => {
                Ok(vec![non_transactional.create_user(session, name)?])
            }
            Scenario::OnNonTransactionalServiceRollback1 => {
                Ok(vec![non_transactional.create_user_and_error(session, name)?])
            }
            Scenario::OnTransactionalService => Ok(vec![transactional.create_user(session, name)?]),
            Scenario::OnTransactionalServiceRollback1 => {
                Ok(vec![transactional.create_user_and_error(session, name)?])
            }
            Scenario::CreateUserTwice => {
                let user1 = transactional.create_user(session, &first)?;
                let user2 = transactional.create_user(session, &second)?;
                Ok(vec![user1, user2])
            }
            Scenario::CreateUserTwiceWithinError => {
                transactional.create_user(session, &first)?;
                Err(Error::operation_failed("rollback test"))
            }
            Scenario::CreateCoupleOfUsers => {
                transactional.create_couple_of_users(session, &first, &second)
            }
            Scenario::CreateCoupleOfUsersRollback1 => transactional
                .create_couple_of_users_and_error_at_last(session, &first, &second),
            Scenario::CreateCoupleOfUsersRollback2 => transactional
                .create_couple_of_users_and_error_next_service(session, &first, &second),
            Scenario::CreateCoupleOfUsersRollback3 => transactional
                .create_couple_of_users_and_error_next_service_and_catch(session, &first, &second),
            Scenario::CreateCoupleOfUsersRollback4 => transactional
                .create_couple_of_users_and_error_from_non_transactional_service(
                    session, &first, &second,
                ),
        }
    }
}

impl std::fmt::Display for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Scenario {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Scenario::ALL
            .iter()
            .copied()
            .find(|scenario| scenario.name() == s)
            .ok_or_else(|| Error::NotFound(format!("scenario '{}'", s)))
    }
}
