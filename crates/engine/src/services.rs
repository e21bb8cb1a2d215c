//! Demo user services
//!
//! Three services with the same shape but different demarcation, used by the
//! scenario catalog to exercise every propagation path:
//! - [`NonTransactionalUserService`]: plain, saves are durable immediately
//! - [`TransactionalUserService`]: transactional, calls the other two
//! - [`AnotherTransactionalService`]: transactional, joins its caller

use tracing::{error, info};
use txprop_concurrency::{Demarcated, Demarcation, Session};
use txprop_core::{Error, Record, Result};

fn rollback_test() -> Error {
    Error::operation_failed("rollback test")
}

/// Saves outside any transaction
#[derive(Debug, Clone, Copy, Default)]
pub struct NonTransactionalUserService;

impl Demarcated for NonTransactionalUserService {
    const DEMARCATION: Demarcation = Demarcation::Plain;
}

impl NonTransactionalUserService {
    /// Save one user
    pub fn create_user(&self, session: &mut Session<'_>, name: &str) -> Result<Record> {
        self.within(session, |s| {
            info!("start service");
            let user = s.save(name)?;
            info!(%user, "end save");
            Ok(user)
        })
    }

    /// Save one user, then fail. The save is not undone.
    pub fn create_user_and_error(&self, session: &mut Session<'_>, name: &str) -> Result<Record> {
        self.within(session, |s| {
            info!("start service");
            let user = s.save(name)?;
            info!(%user, "end save");
            Err(rollback_test())
        })
    }
}

/// Transactional service called from [`TransactionalUserService`]
#[derive(Debug, Clone, Copy, Default)]
pub struct AnotherTransactionalService;

impl Demarcated for AnotherTransactionalService {
    const DEMARCATION: Demarcation = Demarcation::Transactional;
}

impl AnotherTransactionalService {
    /// Save one user
    pub fn create_user(&self, session: &mut Session<'_>, name: &str) -> Result<Record> {
        self.within(session, |s| {
            info!("start another service");
            let user = s.save(name)?;
            info!(%user, "end save");
            info!("end another service");
            Ok(user)
        })
    }

    /// Save one user, then fail
    pub fn create_user_and_error(&self, session: &mut Session<'_>, name: &str) -> Result<Record> {
        self.within(session, |s| {
            info!("start another service");
            let user = s.save(name)?;
            info!(%user, "end save");
            Err(rollback_test())
        })
    }
}

/// Transactional entry point for the demo
#[derive(Debug, Clone, Copy, Default)]
pub struct TransactionalUserService {
    another: AnotherTransactionalService,
    non_transactional: NonTransactionalUserService,
}

impl Demarcated for TransactionalUserService {
    const DEMARCATION: Demarcation = Demarcation::Transactional;
}

impl TransactionalUserService {
    /// Service wired to its collaborators
    pub fn new(
        another: AnotherTransactionalService,
        non_transactional: NonTransactionalUserService,
    ) -> Self {
        Self {
            another,
            non_transactional,
        }
    }

    /// Save one user
    pub fn create_user(&self, session: &mut Session<'_>, name: &str) -> Result<Record> {
        self.within(session, |s| {
            info!("start service");
            let user = s.save(name)?;
            info!(%user, "end save");
            Ok(user)
        })
    }

    /// Save one user, then fail before the boundary commits
    pub fn create_user_and_error(&self, session: &mut Session<'_>, name: &str) -> Result<Record> {
        self.within(session, |s| {
            info!("start service");
            let user = s.save(name)?;
            info!(%user, "end save");
            Err(rollback_test())
        })
    }

    /// Save one user here and one in [`AnotherTransactionalService`]
    pub fn create_couple_of_users(
        &self,
        session: &mut Session<'_>,
        name1: &str,
        name2: &str,
    ) -> Result<Vec<Record>> {
        self.within(session, |s| {
            info!("start service");
            let user1 = s.save(name1)?;
            info!(user = %user1, "end save");
            let user2 = self.another.create_user(s, name2)?;
            Ok(vec![user1, user2])
        })
    }

    /// Both saves succeed, then this level fails
    pub fn create_couple_of_users_and_error_at_last(
        &self,
        session: &mut Session<'_>,
        name1: &str,
        name2: &str,
    ) -> Result<Vec<Record>> {
        self.within(session, |s| {
            info!("start service");
            let user1 = s.save(name1)?;
            info!(user = %user1, "end save");
            let _user2 = self.another.create_user(s, name2)?;
            Err(rollback_test())
        })
    }

    /// The nested transactional service fails and the error propagates
    pub fn create_couple_of_users_and_error_next_service(
        &self,
        session: &mut Session<'_>,
        name1: &str,
        name2: &str,
    ) -> Result<Vec<Record>> {
        self.within(session, |s| {
            info!("start service");
            let user1 = s.save(name1)?;
            info!(user = %user1, "end save");
            let user2 = self.another.create_user_and_error(s, name2)?;
            Ok(vec![user1, user2])
        })
    }

    /// The nested transactional service fails and the error is swallowed
    ///
    /// The transaction is already rollback-only, so the caller gets
    /// [`Error::UnexpectedRollback`] instead of the returned users.
    pub fn create_couple_of_users_and_error_next_service_and_catch(
        &self,
        session: &mut Session<'_>,
        name1: &str,
        name2: &str,
    ) -> Result<Vec<Record>> {
        self.within(session, |s| {
            info!("start service");
            let user1 = s.save(name1)?;
            info!(user = %user1, "end save");
            if let Err(err) = self.another.create_user_and_error(s, name2) {
                error!(error = %err, "catch error");
            }
            Ok(vec![user1.clone(), user1])
        })
    }

    /// The nested plain service fails and the error is swallowed
    ///
    /// Nothing poisons the transaction: both users are persisted.
    pub fn create_couple_of_users_and_error_from_non_transactional_service(
        &self,
        session: &mut Session<'_>,
        name1: &str,
        name2: &str,
    ) -> Result<Vec<Record>> {
        self.within(session, |s| {
            info!("start service");
            let user1 = s.save(name1)?;
            info!(user = %user1, "end save");
            if let Err(err) = self.non_transactional.create_user_and_error(s, name2) {
                error!(error = %err, "catch error");
            }
            Ok(vec![user1])
        })
    }
}
