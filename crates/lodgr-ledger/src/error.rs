//! Ledger error types.

use lodgr_core::error::LodgrError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("operation exceeded its deadline")]
    Deadline,

    #[error("gave up after {attempts} conflicting attempts")]
    RetriesExhausted { attempts: u32 },

    #[error("identity provider failure: {0}")]
    Identity(String),
}

impl From<LedgerError> for LodgrError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Deadline => LodgrError::Timeout,
            LedgerError::RetriesExhausted { .. } => LodgrError::ConcurrentModification,
            LedgerError::Identity(msg) => LodgrError::Identity(msg),
        }
    }
}
