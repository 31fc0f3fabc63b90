#![allow(dead_code)]

use chrono::{NaiveDate, TimeZone, Utc};
use farmjob_core::*;
use farmjob_ledger::*;

pub fn ids(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn field(id: &str, gps: f64, crop: Crop) -> Field {
    let mut f = Field::new(id, format!("Field {id}"));
    f.gps_acres = Some(gps);
    f.registry_acres = Some(gps - 1.0);
    f.crops.insert(2024, crop);
    f
}

pub fn registry() -> StaticRegistry {
    let mut f1 = field("F1", 80.0, Crop::Rice);
    f1.shares = vec![
        PartnerShare::new("Delta Farms", ShareRole::Operator, 75.0),
        PartnerShare::new("Smith Trust", ShareRole::Landowner, 25.0),
    ];
    f1.boundary = vec![
        LatLng::new(34.0, -91.0),
        LatLng::new(34.0, -90.99),
        LatLng::new(34.005, -90.99),
        LatLng::new(34.005, -91.0),
    ];

    let f2 = field("F2", 40.0, Crop::Soybean);

    let mut f3 = field("F3", 60.0, Crop::Rice);
    f3.shares = vec![
        PartnerShare::new("Delta Farms", ShareRole::Operator, 50.0),
        PartnerShare::new("Hill Ag", ShareRole::Operator, 50.0),
    ];

    let mut f4 = field("F4", 100.0, Crop::Rice);
    f4.levee_acres = LeveeAcres {
        rice: Some(12.5),
        soybean: None,
    };

    StaticRegistry::new()
        .with_field(f1)
        .with_field(f2)
        .with_field(f3)
        .with_field(f4)
}

pub fn catalog() -> StaticCatalog {
    StaticCatalog::new()
        .with_product(Product {
            id: "GLY".into(),
            name: "Glyphosate".into(),
            kind: ProductKind::Chemical,
            crop: None,
            unit: RateUnit::FlOzPerAcre,
        })
        .with_product(Product {
            id: "URE".into(),
            name: "Urea".into(),
            kind: ProductKind::Fertilizer,
            crop: None,
            unit: RateUnit::LbsPerAcre,
        })
        .with_product(Product {
            id: "RS".into(),
            name: "Rice seed CL111".into(),
            kind: ProductKind::Seed,
            crop: Some(Crop::Rice),
            unit: RateUnit::SeedsPerAcre,
        })
}

pub fn session_from(registry: &StaticRegistry) -> Session {
    let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    Session::fetch_at(registry, &catalog(), at)
}

pub fn session() -> Session {
    session_from(&registry())
}

pub fn attrs(job_type: JobType, products: Vec<ProductLine>) -> SharedAttrs {
    SharedAttrs {
        job_type: Some(job_type),
        date: NaiveDate::from_ymd_opt(2024, 5, 2),
        crop_year: 2024,
        products,
        ..SharedAttrs::default()
    }
}

pub fn spraying() -> SharedAttrs {
    attrs(
        JobType::Spraying,
        vec![ProductLine::new("GLY", 32.0, RateUnit::FlOzPerAcre)],
    )
}

pub fn create(
    ledger: &JobLedger,
    session: &Session,
    group_id: Option<&str>,
    fields: &[&str],
    attrs: SharedAttrs,
) -> JobOutcome {
    ledger
        .create(
            session,
            CreateJob {
                group_id: group_id.map(str::to_string),
                field_ids: ids(fields),
                attrs,
            },
        )
        .unwrap()
}

pub fn get(ledger: &JobLedger, id: &str) -> FieldJob {
    ledger.field_job(id).unwrap().unwrap()
}

pub fn rect(lat0: f64, lng0: f64, lat1: f64, lng1: f64) -> Vec<LatLng> {
    vec![
        LatLng::new(lat0, lng0),
        LatLng::new(lat0, lng1),
        LatLng::new(lat1, lng1),
        LatLng::new(lat1, lng0),
    ]
}
