use std::fmt;

use thiserror::Error;

use crate::job::{JobDetails, SharedAttrs};

/// One problem with a submitted form, keyed by the form field it concerns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("job is invalid: {}", join_issues(.issues))]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationError {
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            issues: vec![ValidationIssue::new(field, message)],
        }
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.issues.iter().any(|i| i.field == field)
    }
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Check shared attributes and produce the validated form.
///
/// All issues are collected, not just the first one.
pub fn validate(attrs: &SharedAttrs) -> Result<JobDetails, ValidationError> {
    let mut issues = Vec::new();

    if attrs.job_type.is_none() {
        issues.push(ValidationIssue::new("job_type", "job type is required"));
    }
    if attrs.date.is_none() {
        issues.push(ValidationIssue::new("date", "date is required"));
    }

    for (idx, line) in attrs.products.iter().enumerate() {
        if let Some(rate) = line.rate {
            if !rate.is_finite() || rate < 0.0 {
                issues.push(ValidationIssue::new(
                    format!("products[{idx}].rate"),
                    "rate must be a non-negative number",
                ));
            }
        }
    }

    if let Some(job_type) = attrs.job_type {
        if job_type.requires_products() && !attrs.products.iter().any(|l| l.is_complete()) {
            issues.push(ValidationIssue::new(
                "products",
                format!("{job_type} needs at least one product with rate and unit"),
            ));
        }
    }

    if let Some(carrier) = attrs.carrier_gpa {
        if !carrier.is_finite() || carrier < 0.0 {
            issues.push(ValidationIssue::new(
                "carrier_gpa",
                "carrier volume must be a non-negative number",
            ));
        }
    }

    match (attrs.job_type, attrs.date) {
        (Some(job_type), Some(date)) if issues.is_empty() => Ok(JobDetails {
            job_type,
            date,
            status: attrs.status,
            vendor: attrs.vendor.clone(),
            applicator: attrs.applicator.clone(),
            notes: attrs.notes.clone(),
            products: attrs.products.clone(),
            crop_year: attrs.crop_year,
            carrier_gpa: attrs.carrier_gpa,
        }),
        _ => Err(ValidationError { issues }),
    }
}
