mod common;

use std::sync::Arc;
use std::thread;

use common::*;
use farmjob_core::*;
use farmjob_ledger::*;
use proptest::prelude::*;

const GROUPS: [&str; 2] = ["G1", "G2"];
const FIELDS: [&str; 4] = ["F1", "F2", "F3", "F4"];

#[derive(Clone, Debug)]
enum Op {
    Create { group: usize, fields: Vec<usize> },
    BatchEdit { group: usize, fields: Vec<usize> },
    EditField { group: usize, field: usize },
    Complete { group: usize, field: usize },
    DeleteJob { group: usize },
    DeleteFieldJob { group: usize, field: usize },
}

fn arb_fields() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0..FIELDS.len(), 0..5)
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..GROUPS.len(), arb_fields()).prop_map(|(group, fields)| Op::Create { group, fields }),
        (0..GROUPS.len(), arb_fields()).prop_map(|(group, fields)| Op::BatchEdit { group, fields }),
        (0..GROUPS.len(), 0..FIELDS.len()).prop_map(|(group, field)| Op::EditField { group, field }),
        (0..GROUPS.len(), 0..FIELDS.len()).prop_map(|(group, field)| Op::Complete { group, field }),
        (0..GROUPS.len()).prop_map(|group| Op::DeleteJob { group }),
        (0..GROUPS.len(), 0..FIELDS.len())
            .prop_map(|(group, field)| Op::DeleteFieldJob { group, field }),
    ]
}

fn field_list(idx: &[usize]) -> Vec<String> {
    idx.iter().map(|i| FIELDS[*i].to_string()).collect()
}

fn apply(ledger: &JobLedger, s: &Session, op: &Op) -> Result<(), LedgerError> {
    match op {
        Op::Create { group, fields } => ledger
            .create(
                s,
                CreateJob {
                    group_id: Some(GROUPS[*group].into()),
                    field_ids: field_list(fields),
                    attrs: spraying(),
                },
            )
            .map(drop),
        Op::BatchEdit { group, fields } => {
            let mut attrs = spraying();
            attrs.notes = format!("batch {fields:?}");
            ledger
                .batch_edit(s, GROUPS[*group], attrs, &field_list(fields))
                .map(drop)
        }
        Op::EditField { group, field } => {
            let mut attrs = spraying();
            attrs.notes = "per field".into();
            ledger
                .edit_field_job(
                    s,
                    &field_job_id(GROUPS[*group], FIELDS[*field]),
                    FieldEdit { attrs, ..FieldEdit::default() },
                )
                .map(drop)
        }
        Op::Complete { group, field } => ledger
            .set_status(
                s,
                &field_job_id(GROUPS[*group], FIELDS[*field]),
                JobStatus::Completed,
            )
            .map(drop),
        Op::DeleteJob { group } => ledger.delete_job(GROUPS[*group]).map(drop),
        Op::DeleteFieldJob { group, field } => ledger
            .delete_field_job(&field_job_id(GROUPS[*group], FIELDS[*field]))
            .map(drop),
    }
}

fn assert_consistent(ledger: &JobLedger) -> Result<(), TestCaseError> {
    let report = ledger.audit().map_err(|e| TestCaseError::fail(e.to_string()))?;
    prop_assert!(report.is_clean(), "violations: {:?}", report.violations);

    let snap = ledger.store().snapshot().map_err(|e| TestCaseError::fail(e.to_string()))?;
    for (_, group) in &snap.groups {
        prop_assert!(group.field_ids.len() >= 2);
    }
    for (key, job) in &snap.field_jobs {
        prop_assert_eq!(key, &job.id);
        if let Some(group_id) = job.membership.linked_to_job_id() {
            let listed = snap
                .groups
                .iter()
                .any(|(id, g)| id == group_id && g.field_ids.iter().any(|f| f == job.field_id()));
            prop_assert!(listed, "{} linked to {} but not listed", job.id, group_id);
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn edit_sequences_keep_membership_consistent(ops in prop::collection::vec(arb_op(), 1..24)) {
        let ledger = JobLedger::default();
        let s = session();
        for op in &ops {
            match apply(&ledger, &s, op) {
                Ok(())
                | Err(LedgerError::GroupNotFound(_))
                | Err(LedgerError::FieldJobNotFound(_))
                | Err(LedgerError::Validation(_)) => {}
                Err(other) => return Err(TestCaseError::fail(other.to_string())),
            }
            assert_consistent(&ledger)?;
        }
    }

    #[test]
    fn resaving_is_idempotent(fields in prop::collection::vec(0..FIELDS.len(), 1..6)) {
        let ledger = JobLedger::default();
        let s = session();
        let req = CreateJob {
            group_id: Some("G1".into()),
            field_ids: field_list(&fields),
            attrs: spraying(),
        };
        ledger.create(&s, req.clone()).map_err(|e| TestCaseError::fail(e.to_string()))?;
        let first = ledger.store().snapshot().map_err(|e| TestCaseError::fail(e.to_string()))?;
        ledger.create(&s, req).map_err(|e| TestCaseError::fail(e.to_string()))?;
        let second = ledger.store().snapshot().map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(first, second);
    }
}

#[test]
fn concurrent_edits_serialize() {
    let ledger = Arc::new(JobLedger::default());
    let s = Arc::new(session());
    create(&ledger, &s, Some("G1"), &FIELDS, spraying());

    let mut handles = Vec::new();
    for field in FIELDS {
        let ledger = Arc::clone(&ledger);
        let s = Arc::clone(&s);
        handles.push(thread::spawn(move || {
            ledger
                .set_status(&s, &field_job_id("G1", field), JobStatus::Completed)
                .map(drop)
        }));
    }
    for round in 0..4 {
        let ledger = Arc::clone(&ledger);
        let s = Arc::clone(&s);
        handles.push(thread::spawn(move || {
            let mut attrs = spraying();
            attrs.notes = format!("round {round}");
            match ledger.batch_edit(&s, "G1", attrs, &ids(&FIELDS)) {
                Ok(_) | Err(LedgerError::GroupNotFound(_)) => Ok(()),
                Err(e) => Err(e),
            }
        }));
    }
    for h in handles {
        h.join().unwrap().unwrap();
    }

    let report = ledger.audit().unwrap();
    assert!(report.is_clean(), "{:?}", report.violations);
    assert_eq!(ledger.store().snapshot().unwrap().field_jobs.len(), FIELDS.len());
}
