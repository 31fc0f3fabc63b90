//! Consistency audit over the persisted collections.
//!
//! The membership pair on a single record is enforced by its type; what can
//! still go wrong lives between records, and that is what this module
//! reports. Nothing here writes.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::store::Collections;

#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConsistencyViolation {
    #[error("field job {id} is stored under {} keys: {}", .keys.len(), .keys.join(", "))]
    DuplicateLogicalId { id: String, keys: Vec<String> },

    #[error("field job stored under {key} should be stored under {id}")]
    KeyMismatch { key: String, id: String },

    #[error("group job {group_id} lists {listed:?} but its linked field jobs are {linked:?}")]
    GroupListMismatch {
        group_id: String,
        listed: Vec<String>,
        linked: Vec<String>,
    },

    #[error("field job {field_job_id} links to missing group job {group_id}")]
    DanglingLink {
        field_job_id: String,
        group_id: String,
    },

    #[error("group job {group_id} lists {members} field(s), a group needs at least two")]
    UndersizedGroup { group_id: String, members: usize },
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    pub groups_checked: usize,
    pub field_jobs_checked: usize,
    pub violations: Vec<ConsistencyViolation>,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

pub fn audit(c: &Collections) -> AuditReport {
    let mut violations = Vec::new();

    let mut keys_by_id: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (key, job) in &c.field_jobs {
        let logical = job.logical_id();
        if *key != logical || job.id != logical {
            violations.push(ConsistencyViolation::KeyMismatch {
                key: key.clone(),
                id: logical.clone(),
            });
        }
        keys_by_id.entry(logical).or_default().push(key.clone());

        if let Some(group_id) = job.membership.linked_to_job_id() {
            if c.group(group_id).is_none() {
                violations.push(ConsistencyViolation::DanglingLink {
                    field_job_id: key.clone(),
                    group_id: group_id.to_string(),
                });
            }
        }
    }

    for (id, keys) in keys_by_id {
        if keys.len() > 1 {
            violations.push(ConsistencyViolation::DuplicateLogicalId { id, keys });
        }
    }

    for (group_id, group) in &c.groups {
        let mut listed = group.field_ids.clone();
        listed.sort();
        let mut linked: Vec<String> = c
            .members_of(group_id)
            .map(|job| job.field_id().to_string())
            .collect();
        linked.sort();

        if listed != linked {
            violations.push(ConsistencyViolation::GroupListMismatch {
                group_id: group_id.clone(),
                listed,
                linked,
            });
        }
        if group.field_ids.len() < 2 {
            violations.push(ConsistencyViolation::UndersizedGroup {
                group_id: group_id.clone(),
                members: group.field_ids.len(),
            });
        }
    }

    for v in &violations {
        warn!(violation = %v, "consistency violation");
    }

    let report = AuditReport {
        groups_checked: c.groups.len(),
        field_jobs_checked: c.field_jobs.len(),
        violations,
    };
    info!(
        groups = report.groups_checked,
        field_jobs = report.field_jobs_checked,
        violations = report.violations.len(),
        "consistency audit finished"
    );
    report
}
