use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Whether a Field Job still belongs to its Group Job.
///
/// Persisted as the `linkedToJobId`/`detached` pair; any other combination
/// is rejected on load, so a record can never be linked and detached at once.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "MembershipRecord", into = "MembershipRecord")]
pub enum Membership {
    Grouped { group_id: String },
    Detached,
}

/// Stored shape of [`Membership`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipRecord {
    pub linked_to_job_id: Option<String>,
    pub detached: bool,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MembershipError {
    #[error("field job is detached but still linked to group job {0}")]
    LinkedAndDetached(String),
    #[error("field job is neither linked to a group job nor detached")]
    Unlinked,
}

impl TryFrom<MembershipRecord> for Membership {
    type Error = MembershipError;

    fn try_from(rec: MembershipRecord) -> Result<Self, Self::Error> {
        match (rec.linked_to_job_id, rec.detached) {
            (Some(group_id), false) => Ok(Membership::Grouped { group_id }),
            (None, true) => Ok(Membership::Detached),
            (Some(group_id), true) => Err(MembershipError::LinkedAndDetached(group_id)),
            (None, false) => Err(MembershipError::Unlinked),
        }
    }
}

impl From<Membership> for MembershipRecord {
    fn from(m: Membership) -> Self {
        match m {
            Membership::Grouped { group_id } => MembershipRecord {
                linked_to_job_id: Some(group_id),
                detached: false,
            },
            Membership::Detached => MembershipRecord {
                linked_to_job_id: None,
                detached: true,
            },
        }
    }
}

impl Membership {
    pub fn grouped(group_id: impl Into<String>) -> Self {
        Membership::Grouped {
            group_id: group_id.into(),
        }
    }

    #[inline]
    pub fn linked_to_job_id(&self) -> Option<&str> {
        match self {
            Membership::Grouped { group_id } => Some(group_id),
            Membership::Detached => None,
        }
    }

    #[inline]
    pub fn is_detached(&self) -> bool {
        matches!(self, Membership::Detached)
    }

    /// Grouped -> Detached. Returns the group the record left, if any.
    /// Detaching an already detached record is a no-op.
    pub fn detach(&mut self) -> Option<String> {
        match std::mem::replace(self, Membership::Detached) {
            Membership::Grouped { group_id } => Some(group_id),
            Membership::Detached => None,
        }
    }
}

/// What a Group Job becomes once its membership list is known.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GroupFate {
    /// Two or more members: the group lives on with this field list.
    Keep(Vec<String>),
    /// One member left: detach it and delete the group.
    Demote { last: String },
    /// No members left: delete the group.
    Delete,
}

/// Population guard shared by every edit that changes a group's members.
pub fn group_fate(mut remaining: Vec<String>) -> GroupFate {
    match remaining.len() {
        0 => GroupFate::Delete,
        1 => GroupFate::Demote {
            last: remaining.remove(0),
        },
        _ => GroupFate::Keep(remaining),
    }
}
