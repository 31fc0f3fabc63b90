pub mod model;
pub mod units;

pub mod cfg;
pub mod geometry;
pub mod job;
pub mod membership;
pub mod normalize;
pub mod shares;
pub mod validate;

pub use model::{Crop, Field, LeveeAcres, PartnerShare, ProductKind, ProductLine, ShareRole};
pub use units::{RateUnit, Unit};

pub use cfg::ConversionCfg;
pub use geometry::{
    resolve_applied_acres, ring_acres, ring_area_sq_m, AcreSource, JobClass, LatLng,
    OverlayProjection, ResolvedAcres, SubPolygon, SQ_METERS_TO_ACRES,
};
pub use job::{
    field_job_id, DrawnAreaEdit, FieldJob, FieldSnapshot, GroupJob, JobDetails, JobStatus,
    JobType, SharedAttrs,
};
pub use membership::{group_fate, GroupFate, Membership, MembershipError, MembershipRecord};
pub use normalize::{normalize, Amount, NormalizeFlag, Normalized};
pub use shares::{role_allocations, split_amount, Split};
pub use validate::{validate, ValidationError, ValidationIssue};
