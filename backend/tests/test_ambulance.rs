//! Tests for the ambulance routine

mod common;

use common::{directory, with_ctx, Recorder};
use health_economy_core::actors::ambulance::{Dispatch, MAX_BATCH};
use health_economy_core::{
    Actor, ActorError, AmbulanceBuilder, EmployeeRole, HospitalBuilder, InsuranceBuilder, ItemKind,
    Role,
};
use std::sync::Arc;

const SALARY: i64 = 2;

#[test]
fn test_salary_constant_matches_catalog() {
    assert_eq!(EmployeeRole::EmergencyStaff.salary(), SALARY);
}

#[test]
fn test_sends_batch_and_invoices_crew() {
    let hospital = Arc::new(Recorder::new(1, Role::Hospital));
    let insurer = Arc::new(Recorder::new(2, Role::Insurance));
    let ambulance = Arc::new(
        AmbulanceBuilder::new(0)
            .funds(200)
            .sick_patients(900)
            .hospitals(vec![1])
            .insurer(2)
            .build(),
    );
    let dir = directory(vec![ambulance.clone(), hospital.clone(), insurer.clone()]);

    let dispatch = with_ctx(&dir, 7, |ctx| ambulance.send_patients(ctx)).unwrap();

    let Dispatch::Sent { hospital: to, sent, admitted } = dispatch else {
        panic!("expected a dispatch, got {dispatch:?}");
    };
    assert_eq!(to, 1);
    assert!((1..=MAX_BATCH).contains(&sent));
    assert_eq!(admitted, sent);
    assert_eq!(ambulance.sick_patients(), 900 - sent);
    assert_eq!(hospital.transfers(), vec![(ItemKind::SickPatient, sent)]);

    assert_eq!(ambulance.funds(), 200 - SALARY);
    assert_eq!(ambulance.employees_paid(), 1);
    assert_eq!(insurer.invoices(), vec![(SALARY, 0)]);
}

#[test]
fn test_skips_when_crew_unaffordable() {
    let insurer = Arc::new(Recorder::new(2, Role::Insurance));
    let hospital = Arc::new(Recorder::new(1, Role::Hospital));
    let ambulance = Arc::new(
        AmbulanceBuilder::new(0)
            .funds(SALARY - 1)
            .sick_patients(10)
            .hospitals(vec![1])
            .insurer(2)
            .build(),
    );
    let dir = directory(vec![ambulance.clone(), hospital.clone(), insurer.clone()]);

    let dispatch = with_ctx(&dir, 1, |ctx| ambulance.send_patients(ctx)).unwrap();

    assert_eq!(dispatch, Dispatch::Skipped);
    assert_eq!(ambulance.sick_patients(), 10);
    assert!(hospital.transfers().is_empty());
    assert!(insurer.invoices().is_empty());
}

#[test]
fn test_skips_when_empty() {
    let ambulance = Arc::new(
        AmbulanceBuilder::new(0)
            .funds(200)
            .hospitals(vec![1])
            .insurer(2)
            .build(),
    );
    let dir = directory(vec![ambulance.clone()]);

    let dispatch = with_ctx(&dir, 1, |ctx| ambulance.send_patients(ctx)).unwrap();
    assert_eq!(dispatch, Dispatch::Skipped);
    assert_eq!(ambulance.funds(), 200);
}

#[test]
fn test_turned_away_patients_stay_and_crew_is_still_paid() {
    let hospital = Arc::new(Recorder::new(1, Role::Hospital).admitting(0));
    let insurer = Arc::new(Recorder::new(2, Role::Insurance));
    let ambulance = Arc::new(
        AmbulanceBuilder::new(0)
            .funds(200)
            .sick_patients(20)
            .hospitals(vec![1])
            .insurer(2)
            .build(),
    );
    let dir = directory(vec![ambulance.clone(), hospital.clone(), insurer.clone()]);

    for day in 0..5 {
        let dispatch = with_ctx(&dir, day, |ctx| ambulance.send_patients(ctx)).unwrap();
        assert_eq!(dispatch.admitted(), 0);
    }

    assert_eq!(ambulance.sick_patients(), 20);
    assert_eq!(hospital.transfers().len(), 5);
    assert_eq!(ambulance.funds(), 200 - 5 * SALARY);
    assert_eq!(ambulance.employees_paid(), 5);
    assert_eq!(insurer.invoices(), vec![(SALARY, 0); 5]);
}

#[test]
fn test_partial_admission_returns_the_rest() {
    // a real hospital with one bed left
    let hospital = Arc::new(HospitalBuilder::new(1, 1).funds(100).insurer(2).build());
    let insurer = Arc::new(InsuranceBuilder::new(2).build());
    let ambulance = Arc::new(
        AmbulanceBuilder::new(0)
            .funds(200)
            .sick_patients(50)
            .hospitals(vec![1])
            .insurer(2)
            .build(),
    );
    let dir = directory(vec![ambulance.clone(), hospital.clone(), insurer.clone()]);

    let dispatch = with_ctx(&dir, 11, |ctx| ambulance.send_patients(ctx)).unwrap();

    assert_eq!(dispatch.admitted(), 1);
    assert_eq!(hospital.sick_patients(), 1);
    assert_eq!(ambulance.sick_patients(), 49);
    assert_eq!(ambulance.patients() + hospital.patients(), 50);
    assert_eq!(insurer.pending_bills_total(), SALARY);
}

#[test]
fn test_missing_insurer_is_an_error_and_keeps_patients() {
    let hospital = Arc::new(Recorder::new(1, Role::Hospital));
    let ambulance = Arc::new(
        AmbulanceBuilder::new(0)
            .funds(200)
            .sick_patients(5)
            .hospitals(vec![1])
            .build(),
    );
    let dir = directory(vec![ambulance.clone(), hospital.clone()]);

    let result = with_ctx(&dir, 1, |ctx| ambulance.send_patients(ctx));

    assert_eq!(
        result,
        Err(ActorError::MissingRoute {
            actor: 0,
            route: "insurer"
        })
    );
    assert_eq!(ambulance.sick_patients(), 5);
    assert!(hospital.transfers().is_empty());
}

#[test]
fn test_rejected_transfer_restores_patients() {
    // routed to an insurer, which cannot take patients
    let insurer = Arc::new(InsuranceBuilder::new(1).build());
    let ambulance = Arc::new(
        AmbulanceBuilder::new(0)
            .funds(200)
            .sick_patients(5)
            .hospitals(vec![1])
            .insurer(1)
            .build(),
    );
    let dir = directory(vec![ambulance.clone(), insurer.clone()]);

    let result = with_ctx(&dir, 1, |ctx| ambulance.send_patients(ctx));

    assert!(matches!(result, Err(ActorError::Unsupported { actor: 1, .. })));
    assert_eq!(ambulance.sick_patients(), 5);
    assert_eq!(ambulance.funds(), 200);
}

#[test]
fn test_run_day_drains_over_many_days() {
    let hospital = Arc::new(Recorder::new(1, Role::Hospital));
    let insurer = Arc::new(Recorder::new(2, Role::Insurance));
    let ambulance = Arc::new(
        AmbulanceBuilder::new(0)
            .funds(200)
            .sick_patients(12)
            .hospitals(vec![1])
            .insurer(2)
            .build(),
    );
    let dir = directory(vec![ambulance.clone(), hospital.clone(), insurer.clone()]);

    with_ctx(&dir, 5, |ctx| {
        for _ in 0..12 {
            ambulance.run_day(ctx).unwrap();
        }
    });

    assert_eq!(ambulance.sick_patients(), 0);
    assert_eq!(hospital.ledger().stock(ItemKind::SickPatient), 12);
    let trips = ambulance.employees_paid() as i64;
    assert_eq!(ambulance.funds(), 200 - trips * SALARY);
    assert_eq!(insurer.invoiced_total(), trips * SALARY);
}
