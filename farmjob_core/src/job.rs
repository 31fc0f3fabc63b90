use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::geometry::{AcreSource, JobClass, LatLng, SubPolygon};
use crate::membership::Membership;
use crate::model::{Crop, PartnerShare, ProductLine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    Seeding,
    Spraying,
    Fertilizing,
    Tillage,
    Leveling,
    LeveePack,
}

impl JobType {
    pub fn class(self) -> JobClass {
        match self {
            JobType::LeveePack => JobClass::Levee,
            _ => JobClass::Ordinary,
        }
    }

    /// Job types that make no sense without at least one product line.
    pub fn requires_products(self) -> bool {
        matches!(
            self,
            JobType::Seeding | JobType::Spraying | JobType::Fertilizing
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            JobType::Seeding => "Seeding",
            JobType::Spraying => "Spraying",
            JobType::Fertilizing => "Fertilizing",
            JobType::Tillage => "Tillage",
            JobType::Leveling => "Leveling",
            JobType::LeveePack => "Levee/Pack",
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    Planned,
    Completed,
}

/// Shared attributes as submitted by a form. Nothing here is trusted yet;
/// [`crate::validate`] turns it into [`JobDetails`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SharedAttrs {
    pub job_type: Option<JobType>,
    pub date: Option<NaiveDate>,
    pub status: JobStatus,
    pub vendor: Option<String>,
    pub applicator: Option<String>,
    pub notes: String,
    pub products: Vec<ProductLine>,
    pub crop_year: i32,
    /// Spray carrier volume in gallons per acre.
    pub carrier_gpa: Option<f64>,
}

/// Validated shared attributes, carried by Group Jobs and Field Jobs alike.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JobDetails {
    pub job_type: JobType,
    pub date: NaiveDate,
    pub status: JobStatus,
    pub vendor: Option<String>,
    pub applicator: Option<String>,
    pub notes: String,
    pub products: Vec<ProductLine>,
    pub crop_year: i32,
    pub carrier_gpa: Option<f64>,
}

impl JobDetails {
    /// Back to the editable form, e.g. to tweak one attribute and resubmit.
    pub fn to_attrs(&self) -> SharedAttrs {
        SharedAttrs {
            job_type: Some(self.job_type),
            date: Some(self.date),
            status: self.status,
            vendor: self.vendor.clone(),
            applicator: self.applicator.clone(),
            notes: self.notes.clone(),
            products: self.products.clone(),
            crop_year: self.crop_year,
            carrier_gpa: self.carrier_gpa,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroupJob {
    pub id: String,
    pub details: JobDetails,
    /// Fields whose Field Jobs are still linked to this group.
    pub field_ids: Vec<String>,
}

/// Field attributes copied onto a Field Job so reports never need the registry.
///
/// The copy goes stale as the registry changes; `synced_at` records when
/// it was taken.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldSnapshot {
    pub field_id: String,
    pub field_name: String,
    pub crop: Option<Crop>,
    pub registry_acres: Option<f64>,
    pub gps_acres: Option<f64>,
    pub shares: Vec<PartnerShare>,
    pub synced_at: DateTime<Utc>,
    /// The field was not in the registry snapshot at sync time.
    pub missing: bool,
}

/// How a per-field edit treats the drawn sub-polygon.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum DrawnAreaEdit {
    #[default]
    Keep,
    Clear,
    Draw(Vec<LatLng>),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldJob {
    /// `{origin_group_id}_{field_id}`; kept after detachment.
    pub id: String,
    /// Group id the record was created under.
    pub origin_group_id: String,
    pub membership: Membership,
    pub details: JobDetails,
    pub field: FieldSnapshot,
    pub sub_polygon: Option<SubPolygon>,
    pub applied_acres: f64,
    pub acre_source: AcreSource,
}

impl FieldJob {
    pub fn field_id(&self) -> &str {
        &self.field.field_id
    }

    pub fn crop(&self) -> Option<&Crop> {
        self.field.crop.as_ref()
    }

    pub fn is_completed(&self) -> bool {
        self.details.status == JobStatus::Completed
    }

    /// Id this record must be stored under.
    pub fn logical_id(&self) -> String {
        field_job_id(&self.origin_group_id, &self.field.field_id)
    }
}

/// Deterministic Field Job id for a group/field pair.
pub fn field_job_id(group_id: &str, field_id: &str) -> String {
    format!("{group_id}_{field_id}")
}
