//! Read contracts for the outside-world registries, and the per-session
//! snapshot taken from them.
//!
//! The ledger never writes to these collaborators. Products implement the
//! traits over whatever backs them; the `Static*` types cover tests and
//! embedders that already hold everything in memory.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use farmjob_core::{Crop, Field, FieldSnapshot, ProductKind, RateUnit};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Field Registry read contract.
pub trait FieldRegistry {
    fn field(&self, id: &str) -> Option<Field>;
    fn fields(&self) -> Vec<Field>;
}

/// Product Catalog read contract.
pub trait ProductCatalog {
    fn products(&self) -> Vec<Product>;
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub kind: ProductKind,
    pub crop: Option<Crop>,
    pub unit: RateUnit,
}

#[derive(Clone, Debug, Default)]
pub struct StaticRegistry {
    fields: BTreeMap<String, Field>,
}

impl StaticRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.insert(field);
        self
    }

    pub fn insert(&mut self, field: Field) {
        self.fields.insert(field.id.clone(), field);
    }

    pub fn remove(&mut self, id: &str) -> Option<Field> {
        self.fields.remove(id)
    }
}

impl FieldRegistry for StaticRegistry {
    fn field(&self, id: &str) -> Option<Field> {
        self.fields.get(id).cloned()
    }

    fn fields(&self) -> Vec<Field> {
        self.fields.values().cloned().collect()
    }
}

#[derive(Clone, Debug, Default)]
pub struct StaticCatalog {
    products: BTreeMap<String, Product>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_product(mut self, product: Product) -> Self {
        self.products.insert(product.id.clone(), product);
        self
    }
}

impl ProductCatalog for StaticCatalog {
    fn products(&self) -> Vec<Product> {
        self.products.values().cloned().collect()
    }
}

/// Registry data fetched once for a user session.
///
/// Everything the ledger needs from the registries is read from here, so a
/// field deleted upstream mid-session simply shows up as missing.
#[derive(Clone, Debug)]
pub struct Session {
    fields: HashMap<String, Field>,
    products: HashMap<String, Product>,
    synced_at: DateTime<Utc>,
}

impl Session {
    pub fn fetch(registry: &dyn FieldRegistry, catalog: &dyn ProductCatalog) -> Self {
        Self::fetch_at(registry, catalog, Utc::now())
    }

    pub fn fetch_at(
        registry: &dyn FieldRegistry,
        catalog: &dyn ProductCatalog,
        synced_at: DateTime<Utc>,
    ) -> Self {
        let fields: HashMap<String, Field> = registry
            .fields()
            .into_iter()
            .map(|f| (f.id.clone(), f))
            .collect();
        let products: HashMap<String, Product> = catalog
            .products()
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect();
        debug!(
            fields = fields.len(),
            products = products.len(),
            "registry snapshot fetched"
        );
        Self {
            fields,
            products,
            synced_at,
        }
    }

    pub fn synced_at(&self) -> DateTime<Utc> {
        self.synced_at
    }

    pub fn field(&self, id: &str) -> Option<&Field> {
        self.fields.get(id)
    }

    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products.get(id)
    }

    /// Denormalized copy of a field for embedding in a Field Job.
    pub fn snapshot_field(&self, field_id: &str, crop_year: i32) -> FieldSnapshot {
        match self.field(field_id) {
            Some(field) => FieldSnapshot {
                field_id: field.id.clone(),
                field_name: field.name.clone(),
                crop: field.crop_for(crop_year).cloned(),
                registry_acres: field.registry_acres,
                gps_acres: field.gps_acres,
                shares: field.shares.clone(),
                synced_at: self.synced_at,
                missing: false,
            },
            None => {
                debug!(field_id, "field missing from registry snapshot");
                FieldSnapshot {
                    field_id: field_id.to_string(),
                    field_name: field_id.to_string(),
                    crop: None,
                    registry_acres: None,
                    gps_acres: None,
                    shares: Vec::new(),
                    synced_at: self.synced_at,
                    missing: true,
                }
            }
        }
    }
}
