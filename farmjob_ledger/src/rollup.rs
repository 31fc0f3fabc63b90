//! Usage and cost rollups over [`UsageLine`]s.
//!
//! Only sums what the ledger already normalized. Flagged lines are listed
//! next to the totals, never folded into them.

use std::collections::BTreeMap;

use farmjob_core::{role_allocations, NormalizeFlag, ShareRole, Unit};
use serde::{Deserialize, Serialize};

use crate::usage::UsageLine;

/// Name used when a line has no vendor or no partner of the requested role.
pub const UNASSIGNED: &str = "Unassigned";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Vendor,
    Operator,
    Landowner,
    Product,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RollupKey {
    pub name: String,
    pub product_id: String,
    pub unit: Unit,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FlaggedUsage {
    pub field_job_id: String,
    pub product_id: String,
    pub flag: NormalizeFlag,
}

/// A purchase with its cost, in a standardized unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PurchaseRecord {
    pub product_id: String,
    pub vendor: String,
    pub quantity: f64,
    pub unit: Unit,
    pub total_cost: f64,
}

/// Average cost per standardized unit, per product.
#[derive(Clone, Debug, Default)]
pub struct CostBasis {
    totals: BTreeMap<(String, Unit), (f64, f64)>,
}

impl CostBasis {
    pub fn from_purchases(records: &[PurchaseRecord]) -> Self {
        let mut totals: BTreeMap<(String, Unit), (f64, f64)> = BTreeMap::new();
        for r in records {
            if !(r.quantity.is_finite() && r.quantity > 0.0 && r.total_cost.is_finite()) {
                continue;
            }
            let e = totals.entry((r.product_id.clone(), r.unit)).or_insert((0.0, 0.0));
            e.0 += r.quantity;
            e.1 += r.total_cost;
        }
        Self { totals }
    }

    pub fn unit_cost(&self, product_id: &str, unit: Unit) -> Option<f64> {
        self.totals
            .get(&(product_id.to_string(), unit))
            .map(|(qty, cost)| cost / qty)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RollupRow {
    pub name: String,
    pub product_id: String,
    pub product_name: String,
    pub amount: f64,
    pub unit: Unit,
    pub unit_cost: Option<f64>,
    pub value: Option<f64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Rollup {
    pub dimension: Dimension,
    totals: BTreeMap<RollupKey, f64>,
    product_names: BTreeMap<String, String>,
    pub flagged: Vec<FlaggedUsage>,
}

impl Rollup {
    pub fn build(dimension: Dimension, lines: &[UsageLine]) -> Self {
        let mut totals: BTreeMap<RollupKey, f64> = BTreeMap::new();
        let mut product_names = BTreeMap::new();
        let mut flagged = Vec::new();

        for line in lines {
            let Some(amount) = line.normalized.standardized() else {
                if let Some(flag) = line.normalized.flag() {
                    flagged.push(FlaggedUsage {
                        field_job_id: line.field_job_id.clone(),
                        product_id: line.product_id.clone(),
                        flag,
                    });
                }
                continue;
            };
            product_names
                .entry(line.product_id.clone())
                .or_insert_with(|| line.product_name.clone());

            let split = match dimension {
                Dimension::Vendor => {
                    let vendor = line.vendor.as_deref().unwrap_or(UNASSIGNED);
                    line.normalized.split([(vendor, 100.0)])
                }
                Dimension::Product => line.normalized.split([(line.product_name.as_str(), 100.0)]),
                Dimension::Operator => split_by_role(line, ShareRole::Operator),
                Dimension::Landowner => split_by_role(line, ShareRole::Landowner),
            };

            for (name, value) in split.unwrap_or_default() {
                let key = RollupKey {
                    name,
                    product_id: line.product_id.clone(),
                    unit: amount.unit,
                };
                *totals.entry(key).or_insert(0.0) += value;
            }
        }

        Self {
            dimension,
            totals,
            product_names,
            flagged,
        }
    }

    pub fn total(&self, name: &str, product_id: &str, unit: Unit) -> f64 {
        let key = RollupKey {
            name: name.to_string(),
            product_id: product_id.to_string(),
            unit,
        };
        self.totals.get(&key).copied().unwrap_or(0.0)
    }

    /// Rows sorted by name, product and unit, valued when a cost basis is given.
    pub fn rows(&self, basis: Option<&CostBasis>) -> Vec<RollupRow> {
        self.totals
            .iter()
            .map(|(key, amount)| {
                let unit_cost = basis.and_then(|b| b.unit_cost(&key.product_id, key.unit));
                RollupRow {
                    name: key.name.clone(),
                    product_id: key.product_id.clone(),
                    product_name: self
                        .product_names
                        .get(&key.product_id)
                        .cloned()
                        .unwrap_or_else(|| key.product_id.clone()),
                    amount: *amount,
                    unit: key.unit,
                    unit_cost,
                    value: unit_cost.map(|c| c * amount),
                }
            })
            .collect()
    }

    /// Sum of valued rows; rows without a cost basis contribute nothing.
    pub fn total_value(&self, basis: &CostBasis) -> f64 {
        self.rows(Some(basis)).iter().filter_map(|r| r.value).sum()
    }
}

fn split_by_role(line: &UsageLine, role: ShareRole) -> Option<farmjob_core::Split> {
    if line.partner_shares.iter().any(|s| s.role == role) {
        line.normalized
            .split(role_allocations(&line.partner_shares, role))
    } else {
        line.normalized.split([(UNASSIGNED, 100.0)])
    }
}
