//! farmjob_ledger
//!
//! Stateful layer over `farmjob_core`.
//!
//! Responsibilities:
//! - own the Group Job / Field Job collections and write them atomically
//! - keep group membership consistent across create, batch edit, per-field
//!   edit and delete
//! - snapshot registry data into each Field Job and resolve applied acres
//! - produce normalized usage lines and usage/cost rollups
//! - audit the stored records for cross-record inconsistencies
//!
//! Non-goals:
//! - no IO beyond JSON snapshot export/import
//! - no async
//! - no unit or acreage policy (lives in core)

pub mod audit;
pub mod catalog;
pub mod cfg;
pub mod error;
pub mod ledger;
pub mod rollup;
pub mod store;
pub mod usage;

pub use audit::{audit, AuditReport, ConsistencyViolation};
pub use catalog::{
    FieldRegistry, Product, ProductCatalog, Session, StaticCatalog, StaticRegistry,
};
pub use cfg::LedgerCfg;
pub use error::LedgerError;
pub use ledger::{CreateJob, FieldEdit, GroupOutcome, JobLedger, JobOutcome};
pub use rollup::{
    CostBasis, Dimension, FlaggedUsage, PurchaseRecord, Rollup, RollupKey, RollupRow, UNASSIGNED,
};
pub use store::{Collections, JobStore, RestoreStats, StoreSnapshot, WriteBatch, WriteOp};
pub use usage::{usage_lines, UsageLine};
