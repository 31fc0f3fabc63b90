//! Error types for farmjob_ledger

use farmjob_core::ValidationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Group job not found: {0}")]
    GroupNotFound(String),

    #[error("Field job not found: {0}")]
    FieldJobNotFound(String),

    #[error("Field job key {key} already holds field {field_id} of group job {group_id}")]
    KeyConflict {
        key: String,
        group_id: String,
        field_id: String,
    },

    #[error("Job store lock poisoned")]
    LockPoisoned,

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),
}
