use chrono::NaiveDate;
use farmjob_core::{
    normalize, ConversionCfg, Crop, FieldJob, JobType, Normalized, PartnerShare, ProductKind,
};
use serde::Serialize;
use tracing::debug;

use crate::catalog::Session;

/// One product applied by one Field Job, normalized and ready to roll up.
///
/// Carries everything a report needs; consumers never re-normalize.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UsageLine {
    pub field_job_id: String,
    pub group_id: String,
    pub job_type: JobType,
    pub date: NaiveDate,
    pub vendor: Option<String>,
    pub applicator: Option<String>,
    pub field_id: String,
    pub field_name: String,
    pub crop: Option<Crop>,
    pub applied_acres: f64,
    pub product_id: String,
    pub product_name: String,
    pub normalized: Normalized,
    pub partner_shares: Vec<PartnerShare>,
}

/// Normalize every product line of `job`.
///
/// Catalog data fills in product kind, crop and unit when the line itself
/// does not carry them; the field's crop is the last fallback for crop context.
pub fn usage_lines(job: &FieldJob, session: &Session, cfg: &ConversionCfg) -> Vec<UsageLine> {
    let mut out = Vec::with_capacity(job.details.products.len());

    for raw in &job.details.products {
        if raw.product_id.trim().is_empty() {
            debug!(field_job_id = %job.id, "skipping product line without a product");
            continue;
        }

        let mut line = raw.clone();
        let product = session.product(&line.product_id);
        if let Some(p) = product {
            if line.kind == ProductKind::Other {
                line.kind = p.kind;
            }
            if line.crop.is_none() {
                line.crop = p.crop.clone();
            }
            if line.unit.is_none() {
                line.unit = Some(p.unit.clone());
            }
        }
        if line.crop.is_none() {
            line.crop = job.crop().cloned();
        }

        let normalized = normalize(&line, job.applied_acres, job.details.carrier_gpa, cfg);

        out.push(UsageLine {
            field_job_id: job.id.clone(),
            group_id: job.origin_group_id.clone(),
            job_type: job.details.job_type,
            date: job.details.date,
            vendor: job.details.vendor.clone(),
            applicator: job.details.applicator.clone(),
            field_id: job.field.field_id.clone(),
            field_name: job.field.field_name.clone(),
            crop: job.field.crop.clone(),
            applied_acres: job.applied_acres,
            product_name: product
                .map(|p| p.name.clone())
                .unwrap_or_else(|| line.product_id.clone()),
            product_id: line.product_id,
            normalized,
            partner_shares: job.field.shares.clone(),
        });
    }

    out
}
