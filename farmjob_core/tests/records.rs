use chrono::NaiveDate;
use farmjob_core::*;

fn attrs(job_type: Option<JobType>) -> SharedAttrs {
    SharedAttrs {
        job_type,
        date: NaiveDate::from_ymd_opt(2024, 4, 12),
        crop_year: 2024,
        ..SharedAttrs::default()
    }
}

#[test]
fn membership_round_trips_through_record_shape() {
    let grouped = Membership::grouped("G1");
    let json = serde_json::to_value(&grouped).unwrap();
    assert_eq!(json, serde_json::json!({ "linkedToJobId": "G1", "detached": false }));

    let back: Membership = serde_json::from_value(json).unwrap();
    assert_eq!(back, grouped);

    let detached: Membership =
        serde_json::from_value(serde_json::json!({ "linkedToJobId": null, "detached": true })).unwrap();
    assert!(detached.is_detached());
}

#[test]
fn inconsistent_membership_records_are_rejected() {
    let both = serde_json::from_value::<Membership>(serde_json::json!({ "linkedToJobId": "G1", "detached": true }));
    assert!(both.is_err());

    let neither = serde_json::from_value::<Membership>(serde_json::json!({ "linkedToJobId": null, "detached": false }));
    assert!(neither.is_err());
}

#[test]
fn detach_transition() {
    let mut m = Membership::grouped("G1");
    assert_eq!(m.linked_to_job_id(), Some("G1"));
    assert_eq!(m.detach(), Some("G1".to_string()));
    assert!(m.is_detached());
    assert_eq!(m.linked_to_job_id(), None);
    assert_eq!(m.detach(), None);
}

#[test]
fn group_fate_by_population() {
    assert_eq!(group_fate(vec![]), GroupFate::Delete);
    assert_eq!(group_fate(vec!["F1".into()]), GroupFate::Demote { last: "F1".into() });
    assert_eq!(
        group_fate(vec!["F1".into(), "F3".into()]),
        GroupFate::Keep(vec!["F1".into(), "F3".into()])
    );
}

#[test]
fn validation_reports_every_missing_field() {
    let mut a = attrs(None);
    a.date = None;
    let err = validate(&a).unwrap_err();
    assert!(err.has_field("job_type"));
    assert!(err.has_field("date"));
    assert!(err.to_string().contains("date is required"));
}

#[test]
fn product_jobs_need_a_complete_line() {
    let mut a = attrs(Some(JobType::Spraying));
    assert!(validate(&a).unwrap_err().has_field("products"));

    a.products.push(ProductLine {
        product_id: "gly".into(),
        rate: Some(32.0),
        unit: None,
        ..ProductLine::default()
    });
    assert!(validate(&a).unwrap_err().has_field("products"));

    a.products.push(ProductLine::new("gly", 32.0, RateUnit::FlOzPerAcre));
    let details = validate(&a).unwrap();
    assert_eq!(details.job_type, JobType::Spraying);
    assert_eq!(details.products.len(), 2);
}

#[test]
fn tillage_needs_no_products() {
    assert!(validate(&attrs(Some(JobType::Tillage))).is_ok());
    assert!(validate(&attrs(Some(JobType::LeveePack))).is_ok());
}

#[test]
fn negative_rates_are_rejected() {
    let mut a = attrs(Some(JobType::Fertilizing));
    a.products.push(ProductLine::new("urea", -5.0, RateUnit::LbsPerAcre));
    a.products.push(ProductLine::new("potash", 100.0, RateUnit::LbsPerAcre));
    assert!(validate(&a).unwrap_err().has_field("products[0].rate"));
}

#[test]
fn unit_labels_parse_into_vocabulary() {
    assert_eq!(RateUnit::parse("Seeds/Acre"), RateUnit::SeedsPerAcre);
    assert_eq!(RateUnit::parse("lbs/ac"), RateUnit::LbsPerAcre);
    assert_eq!(RateUnit::parse("fl. oz/acre"), RateUnit::FlOzPerAcre);
    assert_eq!(RateUnit::parse("oz dry/acre"), RateUnit::OzDryPerAcre);
    assert_eq!(RateUnit::parse("%"), RateUnit::PercentOfCarrier);
    assert_eq!(RateUnit::parse("gal/acre"), RateUnit::Other("gal/acre".into()));

    for unit in RateUnit::KNOWN {
        assert!(unit.is_known());
        assert_eq!(RateUnit::parse(unit.label()), unit);
    }
}

#[test]
fn job_type_classification() {
    assert_eq!(JobType::LeveePack.class(), JobClass::Levee);
    assert_eq!(JobType::Seeding.class(), JobClass::Ordinary);
    assert!(JobType::Seeding.requires_products());
    assert!(!JobType::Leveling.requires_products());
    assert_eq!(field_job_id("G1", "F2"), "G1_F2");
}

#[test]
fn crop_names() {
    assert_eq!(Crop::from_name(" Soybeans "), Some(Crop::Soybean));
    assert_eq!(Crop::from_name("RICE"), Some(Crop::Rice));
    assert_eq!(Crop::from_name("Milo"), Some(Crop::Other("Milo".into())));
    assert_eq!(Crop::from_name("  "), None);
}
