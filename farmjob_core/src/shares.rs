use std::collections::BTreeMap;

use crate::model::{PartnerShare, ShareRole};

// ---------------------------------------------------------------------
// Partner / vendor allocation of a standardized amount
// ---------------------------------------------------------------------

/// Amount per partner or vendor name.
pub type Split = BTreeMap<String, f64>;

/// Pro-rate `amount` over `(key, percent)` pairs, summing repeated keys.
///
/// Percentages are taken as given: they are not rescaled to 100, so a field
/// whose shares add up to 80% allocates 80% of the amount. Non-finite or
/// negative percentages contribute nothing.
pub fn split_amount<'a, I>(amount: f64, allocations: I) -> Split
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    let mut out = Split::new();
    for (key, percent) in allocations {
        if !percent.is_finite() || percent < 0.0 {
            continue;
        }
        *out.entry(key.to_string()).or_insert(0.0) += amount * percent / 100.0;
    }
    out
}

/// `(name, percent)` pairs for one partner role.
pub fn role_allocations(
    shares: &[PartnerShare],
    role: ShareRole,
) -> impl Iterator<Item = (&str, f64)> {
    shares
        .iter()
        .filter(move |s| s.role == role)
        .map(|s| (s.name.as_str(), s.percent))
}
