//! Two-collection job store with all-or-nothing batched writes.
//!
//! Every mutation goes through [`JobStore::transact`]: the caller plans a
//! [`WriteBatch`] against a read view while holding the store lock, and the
//! batch is applied only if planning succeeded. Applying a batch cannot
//! fail, so a job's records are never half-written.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use farmjob_core::{FieldJob, GroupJob};
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// The persisted collections, keyed by storage key.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Collections {
    pub groups: BTreeMap<String, GroupJob>,
    pub field_jobs: BTreeMap<String, FieldJob>,
}

impl Collections {
    pub fn group(&self, id: &str) -> Option<&GroupJob> {
        self.groups.get(id)
    }

    pub fn field_job(&self, id: &str) -> Option<&FieldJob> {
        self.field_jobs.get(id)
    }

    /// Field Jobs whose back-reference points at `group_id`.
    pub fn members_of<'a>(&'a self, group_id: &'a str) -> impl Iterator<Item = &'a FieldJob> + 'a {
        self.field_jobs
            .values()
            .filter(move |job| job.membership.linked_to_job_id() == Some(group_id))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum WriteOp {
    PutGroup(GroupJob),
    DeleteGroup(String),
    PutFieldJob(FieldJob),
    DeleteFieldJob(String),
}

/// Ordered writes for one job. Later ops on the same key win.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_group(&mut self, group: GroupJob) {
        self.ops.push(WriteOp::PutGroup(group));
    }

    pub fn delete_group(&mut self, id: impl Into<String>) {
        self.ops.push(WriteOp::DeleteGroup(id.into()));
    }

    pub fn put_field_job(&mut self, job: FieldJob) {
        self.ops.push(WriteOp::PutFieldJob(job));
    }

    pub fn delete_field_job(&mut self, id: impl Into<String>) {
        self.ops.push(WriteOp::DeleteFieldJob(id.into()));
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    fn apply(self, target: &mut Collections) {
        for op in self.ops {
            match op {
                WriteOp::PutGroup(group) => {
                    target.groups.insert(group.id.clone(), group);
                }
                WriteOp::DeleteGroup(id) => {
                    target.groups.remove(&id);
                }
                WriteOp::PutFieldJob(job) => {
                    target.field_jobs.insert(job.id.clone(), job);
                }
                WriteOp::DeleteFieldJob(id) => {
                    target.field_jobs.remove(&id);
                }
            }
        }
    }
}

/// Snapshot of the store for storage-agnostic persistence.
///
/// Entries are `(storage key, record)` pairs sorted by key.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub groups: Vec<(String, GroupJob)>,
    pub field_jobs: Vec<(String, FieldJob)>,
}

/// Counters returned by restore operations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreStats {
    /// Records applied from the snapshot.
    pub applied: usize,
    /// Existing records that were overwritten.
    pub overwritten: usize,
}

#[derive(Debug, Default)]
pub struct JobStore {
    inner: Mutex<Collections>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Collections>, LedgerError> {
        self.inner.lock().map_err(|_| LedgerError::LockPoisoned)
    }

    /// Read-only access to the collections.
    pub fn read<F, T>(&self, f: F) -> Result<T, LedgerError>
    where
        F: FnOnce(&Collections) -> T,
    {
        let guard = self.lock()?;
        Ok(f(&*guard))
    }

    /// Plan and apply one atomic batch.
    ///
    /// If `plan` returns an error nothing is written. The lock is held from
    /// planning through apply, so concurrent callers serialize per store and
    /// the last one to commit wins.
    pub fn transact<F, T>(&self, plan: F) -> Result<T, LedgerError>
    where
        F: FnOnce(&Collections) -> Result<(WriteBatch, T), LedgerError>,
    {
        let mut guard = self.lock()?;
        let (batch, out) = plan(&*guard)?;
        batch.apply(&mut *guard);
        Ok(out)
    }

    /// Export both collections.
    pub fn snapshot(&self) -> Result<StoreSnapshot, LedgerError> {
        self.read(|c| StoreSnapshot {
            groups: c.groups.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            field_jobs: c
                .field_jobs
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        })
    }

    /// Replace the store contents with a snapshot.
    pub fn restore(&self, snap: StoreSnapshot) -> Result<RestoreStats, LedgerError> {
        let mut guard = self.lock()?;
        guard.groups.clear();
        guard.field_jobs.clear();
        Ok(Self::import(&mut *guard, snap))
    }

    /// Merge a snapshot into the current contents; snapshot entries win.
    pub fn restore_merge(&self, snap: StoreSnapshot) -> Result<RestoreStats, LedgerError> {
        let mut guard = self.lock()?;
        Ok(Self::import(&mut *guard, snap))
    }

    fn import(target: &mut Collections, snap: StoreSnapshot) -> RestoreStats {
        let mut stats = RestoreStats::default();
        for (key, group) in snap.groups {
            if target.groups.insert(key, group).is_some() {
                stats.overwritten += 1;
            }
            stats.applied += 1;
        }
        // Keys are taken as stored, even when they disagree with the record id;
        // the audit reports such records.
        for (key, job) in snap.field_jobs {
            if target.field_jobs.insert(key, job).is_some() {
                stats.overwritten += 1;
            }
            stats.applied += 1;
        }
        stats
    }

    pub fn to_json(&self) -> Result<String, LedgerError> {
        Ok(serde_json::to_string(&self.snapshot()?)?)
    }

    pub fn restore_json(&self, json: &str) -> Result<RestoreStats, LedgerError> {
        let snap: StoreSnapshot = serde_json::from_str(json)?;
        self.restore(snap)
    }
}
