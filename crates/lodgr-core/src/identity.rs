//! Identity-provider trait definition.
//!
//! Account management (credentials, activation, token issuance) is a
//! separate collaborator; the ledger only needs account creation and
//! deletion plus a fail-fast email existence check.

use uuid::Uuid;

use crate::error::LodgrResult;
use crate::models::account::{Account, NewAccount};

pub trait IdentityProvider: Send + Sync {
    /// Whether an account with this email already exists. Used to fail
    /// fast before any transaction starts.
    fn email_exists(&self, email: &str) -> impl Future<Output = LodgrResult<bool>> + Send;

    /// Create an account. Fails with `DuplicateIdentity` on email reuse.
    fn create_account(
        &self,
        input: NewAccount,
    ) -> impl Future<Output = LodgrResult<Account>> + Send;

    fn get_account(&self, id: Uuid) -> impl Future<Output = LodgrResult<Account>> + Send;

    fn delete_account(&self, id: Uuid) -> impl Future<Output = LodgrResult<()>> + Send;
}
