//! Job aggregate builder.
//!
//! Owns the two-tier record model: one Group Job fans out into one Field Job
//! per field, and every edit keeps the two sides in agreement:
//! - a Group Job lists exactly the Field Jobs still linked to it
//! - editing a single Field Job detaches it from its group
//! - a group left with one member detaches that member and is deleted
//!
//! Each public operation is one [`JobStore::transact`] call, so a job's
//! records are written together or not at all.

use std::collections::HashSet;

use farmjob_core::{
    field_job_id, group_fate, resolve_applied_acres, validate, DrawnAreaEdit, FieldJob, GroupFate,
    GroupJob, JobDetails, JobStatus, Membership, OverlayProjection, SharedAttrs, SubPolygon,
    ValidationError,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::audit::{audit, AuditReport};
use crate::catalog::Session;
use crate::cfg::LedgerCfg;
use crate::error::LedgerError;
use crate::store::{Collections, JobStore, WriteBatch};
use crate::usage::{usage_lines, UsageLine};

/// Request to create (or re-save) a job over a set of fields.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CreateJob {
    /// Existing group id to re-save under; a new id is allocated when `None`.
    pub group_id: Option<String>,
    pub field_ids: Vec<String>,
    pub attrs: SharedAttrs,
}

/// Per-field edit: new attributes plus what to do with the drawn sub-area.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldEdit {
    pub attrs: SharedAttrs,
    pub drawn_area: DrawnAreaEdit,
}

/// State of the Group Job after an operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GroupOutcome {
    Active {
        group_id: String,
        field_ids: Vec<String>,
    },
    /// The group was deleted; `detached` is the member demoted with it, if any.
    Dissolved {
        group_id: String,
        detached: Option<String>,
    },
    /// No group involved (single-field job or already detached record).
    Standalone,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobOutcome {
    pub group: GroupOutcome,
    /// Field Job ids written by the operation.
    pub written: Vec<String>,
    /// Field Job ids left alone because they were already detached.
    pub skipped: Vec<String>,
}

fn new_group_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Field Job key for `(group_id, field_id)`, refused when another job's
/// record already lives under it.
fn claim_key(view: &Collections, group_id: &str, field_id: &str) -> Result<String, LedgerError> {
    let key = field_job_id(group_id, field_id);
    match view.field_job(&key) {
        Some(existing) if existing.origin_group_id != group_id || existing.field_id() != field_id => {
            Err(LedgerError::KeyConflict {
                key,
                group_id: existing.origin_group_id.clone(),
                field_id: existing.field_id().to_string(),
            })
        }
        _ => Ok(key),
    }
}

/// Trimmed, non-empty ids in first-seen order.
fn dedup_ids(ids: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.iter()
        .map(|id| id.trim())
        .filter(|id| !id.is_empty() && seen.insert(id.to_string()))
        .map(str::to_string)
        .collect()
}

/// Snapshot the field and resolve its acreage into `job`.
fn sync_field(session: &Session, job: &mut FieldJob) {
    match session.field(job.field_id()) {
        Some(_) => job.field = session.snapshot_field(job.field_id(), job.details.crop_year),
        None => job.field.missing = true,
    }
    let resolved = resolve_applied_acres(
        session.field(job.field_id()),
        job.details.job_type.class(),
        job.field.crop.as_ref(),
        job.sub_polygon.as_ref(),
    );
    job.applied_acres = resolved.acres;
    job.acre_source = resolved.source;
}

fn build_field_job(
    session: &Session,
    group_id: &str,
    field_id: &str,
    details: &JobDetails,
    membership: Membership,
    sub_polygon: Option<SubPolygon>,
) -> FieldJob {
    let mut job = FieldJob {
        id: field_job_id(group_id, field_id),
        origin_group_id: group_id.to_string(),
        membership,
        details: details.clone(),
        field: session.snapshot_field(field_id, details.crop_year),
        sub_polygon,
        applied_acres: 0.0,
        acre_source: Default::default(),
    };
    sync_field(session, &mut job);
    job
}

/// Apply the population rule to `group` with its new member list.
///
/// A demoted member is detached in `pending` when it is being written by
/// the same batch, otherwise a detached copy is added to `pending`.
fn settle_group(
    view: &Collections,
    mut group: GroupJob,
    remaining: Vec<String>,
    batch: &mut WriteBatch,
    pending: &mut Vec<FieldJob>,
) -> GroupOutcome {
    let group_id = group.id.clone();
    match group_fate(remaining) {
        GroupFate::Keep(field_ids) => {
            group.field_ids = field_ids.clone();
            batch.put_group(group);
            GroupOutcome::Active {
                group_id,
                field_ids,
            }
        }
        GroupFate::Demote { last } => {
            let last_id = field_job_id(&group_id, &last);
            if let Some(pos) = pending.iter().position(|j| j.id == last_id) {
                pending[pos].membership.detach();
            } else if let Some(job) = view.field_job(&last_id) {
                let mut job = job.clone();
                job.membership.detach();
                pending.push(job);
            } else {
                warn!(group_id = %group_id, field_job_id = %last_id, "last listed member has no field job");
            }
            batch.delete_group(group_id.clone());
            info!(group_id = %group_id, field_job_id = %last_id, "group job down to one member, dissolved");
            GroupOutcome::Dissolved {
                group_id,
                detached: Some(last_id),
            }
        }
        GroupFate::Delete => {
            batch.delete_group(group_id.clone());
            info!(group_id = %group_id, "group job emptied, deleted");
            GroupOutcome::Dissolved {
                group_id,
                detached: None,
            }
        }
    }
}

/// Remove `leaving` from its group's list and settle the group.
fn release_member(
    view: &Collections,
    group_id: &str,
    leaving: &str,
    batch: &mut WriteBatch,
    pending: &mut Vec<FieldJob>,
) -> GroupOutcome {
    let Some(group) = view.group(group_id) else {
        warn!(group_id, field_job_id = leaving, "field job linked to a missing group job");
        return GroupOutcome::Dissolved {
            group_id: group_id.to_string(),
            detached: None,
        };
    };
    let remaining: Vec<String> = group
        .field_ids
        .iter()
        .filter(|field_id| field_job_id(group_id, field_id) != leaving)
        .cloned()
        .collect();
    settle_group(view, group.clone(), remaining, batch, pending)
}

fn flush(batch: &mut WriteBatch, pending: Vec<FieldJob>) -> Vec<String> {
    let mut written = Vec::with_capacity(pending.len());
    for job in pending {
        written.push(job.id.clone());
        batch.put_field_job(job);
    }
    written
}

#[derive(Debug, Default)]
pub struct JobLedger {
    store: JobStore,
    cfg: LedgerCfg,
}

impl JobLedger {
    pub fn new(cfg: LedgerCfg) -> Self {
        Self {
            store: JobStore::new(),
            cfg,
        }
    }

    pub fn with_store(store: JobStore, cfg: LedgerCfg) -> Self {
        Self { store, cfg }
    }

    pub fn store(&self) -> &JobStore {
        &self.store
    }

    pub fn cfg(&self) -> &LedgerCfg {
        &self.cfg
    }

    /// Create a job over `req.field_ids`.
    ///
    /// Field Job ids are `{group_id}_{field_id}`, so creating again with the
    /// same group id overwrites instead of duplicating. Members of the old
    /// version that are no longer listed are deleted. A single field yields
    /// one detached Field Job and no Group Job.
    pub fn create(&self, session: &Session, req: CreateJob) -> Result<JobOutcome, LedgerError> {
        let details = validate(&req.attrs)?;
        let field_ids = dedup_ids(&req.field_ids);
        if field_ids.is_empty() {
            return Err(ValidationError::single("fields", "at least one field is required").into());
        }
        let group_id = req
            .group_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(new_group_id);
        // `_` separates group and field in Field Job keys
        if group_id.contains('_') {
            return Err(ValidationError::single("group_id", "group id must not contain '_'").into());
        }

        let outcome = self.store.transact(|view| {
            for field_id in &field_ids {
                claim_key(view, &group_id, field_id)?;
            }
            let mut batch = WriteBatch::new();

            let listed: HashSet<&str> = field_ids.iter().map(String::as_str).collect();
            for stale in view
                .members_of(&group_id)
                .filter(|job| !listed.contains(job.field_id()))
            {
                batch.delete_field_job(stale.id.clone());
            }

            let grouped = field_ids.len() > 1;
            let pending: Vec<FieldJob> = field_ids
                .iter()
                .map(|field_id| {
                    let membership = if grouped {
                        Membership::grouped(&group_id)
                    } else {
                        Membership::Detached
                    };
                    build_field_job(session, &group_id, field_id, &details, membership, None)
                })
                .collect();
            let written = flush(&mut batch, pending);

            let group = if grouped {
                batch.put_group(GroupJob {
                    id: group_id.clone(),
                    details: details.clone(),
                    field_ids: field_ids.clone(),
                });
                GroupOutcome::Active {
                    group_id: group_id.clone(),
                    field_ids: field_ids.clone(),
                }
            } else {
                if view.group(&group_id).is_some() {
                    batch.delete_group(group_id.clone());
                }
                GroupOutcome::Standalone
            };

            Ok((
                batch,
                JobOutcome {
                    group,
                    written,
                    skipped: Vec::new(),
                },
            ))
        })?;

        info!(
            group_id = %group_id,
            job_type = %details.job_type,
            fields = field_ids.len(),
            "job created"
        );
        Ok(outcome)
    }

    /// Rewrite a group's shared attributes and field list.
    ///
    /// Listed fields that were detached earlier are skipped and stay
    /// detached. Linked members no longer listed are deleted.
    pub fn batch_edit(
        &self,
        session: &Session,
        group_id: &str,
        attrs: SharedAttrs,
        field_ids: &[String],
    ) -> Result<JobOutcome, LedgerError> {
        let details = validate(&attrs)?;
        let requested = dedup_ids(field_ids);

        let outcome = self.store.transact(|view| {
            let group = view
                .group(group_id)
                .ok_or_else(|| LedgerError::GroupNotFound(group_id.to_string()))?;

            let mut batch = WriteBatch::new();
            let mut pending = Vec::new();
            let mut members = Vec::new();
            let mut skipped = Vec::new();

            for field_id in &requested {
                let id = claim_key(view, group_id, field_id)?;
                let existing = view.field_job(&id);
                if existing.map(|j| j.membership.is_detached()).unwrap_or(false) {
                    skipped.push(id);
                    continue;
                }
                let drawn = existing.and_then(|j| j.sub_polygon.clone());
                pending.push(build_field_job(
                    session,
                    group_id,
                    field_id,
                    &details,
                    Membership::grouped(group_id),
                    drawn,
                ));
                members.push(field_id.clone());
            }

            let keep: HashSet<&str> = members.iter().map(String::as_str).collect();
            for dropped in view
                .members_of(group_id)
                .filter(|job| !keep.contains(job.field_id()))
            {
                batch.delete_field_job(dropped.id.clone());
            }

            let mut updated = group.clone();
            updated.details = details.clone();
            let group = settle_group(view, updated, members, &mut batch, &mut pending);
            let written = flush(&mut batch, pending);

            Ok((
                batch,
                JobOutcome {
                    group,
                    written,
                    skipped,
                },
            ))
        })?;

        info!(
            group_id,
            written = outcome.written.len(),
            skipped = outcome.skipped.len(),
            "group job edited"
        );
        Ok(outcome)
    }

    /// Edit one Field Job. The record always detaches from its group.
    pub fn edit_field_job(
        &self,
        session: &Session,
        field_job_id: &str,
        edit: FieldEdit,
    ) -> Result<JobOutcome, LedgerError> {
        let details = validate(&edit.attrs)?;
        let drawn_area = edit.drawn_area;
        self.apply_field_edit(session, field_job_id, move |job| {
            job.details = details;
            match drawn_area {
                DrawnAreaEdit::Keep => {}
                DrawnAreaEdit::Clear => job.sub_polygon = None,
                DrawnAreaEdit::Draw(ring) => job.sub_polygon = Some(SubPolygon::measure(ring)),
            }
        })
    }

    /// Change the status of one Field Job; a per-field edit like any other.
    pub fn set_status(
        &self,
        session: &Session,
        field_job_id: &str,
        status: JobStatus,
    ) -> Result<JobOutcome, LedgerError> {
        self.apply_field_edit(session, field_job_id, move |job| job.details.status = status)
    }

    fn apply_field_edit<F>(
        &self,
        session: &Session,
        id: &str,
        edit: F,
    ) -> Result<JobOutcome, LedgerError>
    where
        F: FnOnce(&mut FieldJob),
    {
        let outcome = self.store.transact(|view| {
            let existing = view
                .field_job(id)
                .ok_or_else(|| LedgerError::FieldJobNotFound(id.to_string()))?;

            let mut job = existing.clone();
            let left = job.membership.detach();
            edit(&mut job);
            sync_field(session, &mut job);

            let mut batch = WriteBatch::new();
            let mut pending = vec![job];
            let group = match left {
                Some(group_id) => release_member(view, &group_id, id, &mut batch, &mut pending),
                None => GroupOutcome::Standalone,
            };
            let written = flush(&mut batch, pending);

            Ok((
                batch,
                JobOutcome {
                    group,
                    written,
                    skipped: Vec::new(),
                },
            ))
        })?;

        info!(field_job_id = id, "field job edited and detached");
        Ok(outcome)
    }

    /// Delete a Group Job and its linked Field Jobs. Detached records survive.
    pub fn delete_job(&self, group_id: &str) -> Result<usize, LedgerError> {
        let removed = self.store.transact(|view| {
            if view.group(group_id).is_none() {
                return Err(LedgerError::GroupNotFound(group_id.to_string()));
            }
            let mut batch = WriteBatch::new();
            let mut removed = 0;
            for member in view.members_of(group_id) {
                batch.delete_field_job(member.id.clone());
                removed += 1;
            }
            batch.delete_group(group_id);
            Ok((batch, removed))
        })?;

        info!(group_id, field_jobs = removed, "job deleted");
        Ok(removed)
    }

    /// Delete one Field Job, settling its group if it was linked.
    pub fn delete_field_job(&self, id: &str) -> Result<GroupOutcome, LedgerError> {
        let outcome = self.store.transact(|view| {
            let job = view
                .field_job(id)
                .ok_or_else(|| LedgerError::FieldJobNotFound(id.to_string()))?;

            let mut batch = WriteBatch::new();
            batch.delete_field_job(id);
            let mut pending = Vec::new();
            let group = match job.membership.linked_to_job_id() {
                Some(group_id) => release_member(view, group_id, id, &mut batch, &mut pending),
                None => GroupOutcome::Standalone,
            };
            flush(&mut batch, pending);
            Ok((batch, group))
        })?;

        info!(field_job_id = id, "field job deleted");
        Ok(outcome)
    }

    pub fn group_job(&self, id: &str) -> Result<Option<GroupJob>, LedgerError> {
        self.store.read(|c| c.group(id).cloned())
    }

    pub fn field_job(&self, id: &str) -> Result<Option<FieldJob>, LedgerError> {
        self.store.read(|c| c.field_job(id).cloned())
    }

    /// Field Jobs still linked to `group_id`, sorted by id.
    pub fn members(&self, group_id: &str) -> Result<Vec<FieldJob>, LedgerError> {
        self.store.read(|c| c.members_of(group_id).cloned().collect())
    }

    /// Run the consistency audit over the whole store. Never repairs anything.
    pub fn audit(&self) -> Result<AuditReport, LedgerError> {
        self.store.read(audit)
    }

    /// Normalized product usage of every Completed Field Job.
    pub fn completed_usage(&self, session: &Session) -> Result<Vec<UsageLine>, LedgerError> {
        let conversion = &self.cfg.conversion;
        self.store.read(|c| {
            c.field_jobs
                .values()
                .filter(|job| job.is_completed())
                .flat_map(|job| usage_lines(job, session, conversion))
                .collect()
        })
    }

    /// Thumbnail outline for a Field Job: the drawn sub-area when present,
    /// otherwise the field boundary.
    pub fn overlay(
        &self,
        session: &Session,
        field_job_id: &str,
    ) -> Result<Option<Vec<(f64, f64)>>, LedgerError> {
        let job = self
            .field_job(field_job_id)?
            .ok_or_else(|| LedgerError::FieldJobNotFound(field_job_id.to_string()))?;

        let ring = match &job.sub_polygon {
            Some(polygon) => polygon.ring.clone(),
            None => session
                .field(job.field_id())
                .map(|f| f.boundary.clone())
                .unwrap_or_default(),
        };
        Ok(
            OverlayProjection::fit(&ring, self.cfg.overlay_size, self.cfg.overlay_padding)
                .map(|proj| proj.project_ring(&ring)),
        )
    }
}
