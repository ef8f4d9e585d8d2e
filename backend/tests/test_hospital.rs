//! Tests for hospital beds, clinic transfers, rehab and payroll

mod common;

use common::{directory, with_ctx, Recorder};
use health_economy_core::actors::hospital::REHAB_DAYS;
use health_economy_core::{
    Actor, ClinicBuilder, ClinicSpecialty, EmployeeRole, HospitalBuilder, ItemKind, Role,
    ServiceKind,
};
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn test_two_concurrent_transfers_fill_five_beds() {
    let hospital = Arc::new(HospitalBuilder::new(0, 5).funds(1_000).build());
    let barrier = Arc::new(Barrier::new(2));

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let hospital = Arc::clone(&hospital);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                hospital.transfer(ItemKind::SickPatient, 10).unwrap()
            })
        })
        .collect();
    let admitted: u32 = handles.into_iter().map(|h| h.join().unwrap()).sum();

    assert_eq!(admitted, 5);
    assert_eq!(hospital.sick_patients(), 5);
}

#[test]
fn test_capacity_holds_under_many_mixed_callers() {
    const BEDS: u32 = 35;
    let hospital = Arc::new(HospitalBuilder::new(0, BEDS).funds(1_000).build());
    let barrier = Arc::new(Barrier::new(16));

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let hospital = Arc::clone(&hospital);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let item = if i % 2 == 0 {
                    ItemKind::SickPatient
                } else {
                    ItemKind::RehabPatient
                };
                (0..10)
                    .map(|_| hospital.transfer(item, 3).unwrap())
                    .sum::<u32>()
            })
        })
        .collect();
    let admitted: u32 = handles.into_iter().map(|h| h.join().unwrap()).sum();

    assert_eq!(admitted, BEDS);
    assert_eq!(hospital.occupancy(), BEDS);
    assert_eq!(hospital.sick_patients() + hospital.rehab_patients(), BEDS);
}

#[test]
fn test_sick_transfer_to_clinic_invoices_pre_treatment() {
    let clinic = Arc::new(
        ClinicBuilder::new(1, ClinicSpecialty::Neurology)
            .funds(300)
            .build(),
    );
    let insurer = Arc::new(Recorder::new(2, Role::Insurance));
    let hospital = Arc::new(
        HospitalBuilder::new(0, 35)
            .funds(1_000)
            .sick_patients(4)
            .clinics(vec![1])
            .insurer(2)
            .build(),
    );
    let dir = directory(vec![hospital.clone(), clinic.clone(), insurer.clone()]);

    let admitted = with_ctx(&dir, 1, |ctx| hospital.transfer_sick_patients_to_clinic(ctx)).unwrap();

    assert_eq!(admitted, 4);
    assert_eq!(hospital.sick_patients(), 0);
    assert_eq!(clinic.sick_patients(), 4);
    assert_eq!(
        insurer.invoices(),
        vec![(ServiceKind::PreTreatmentStay.price_for(4), 0)]
    );
}

#[test]
fn test_refused_patients_stay_and_nothing_is_invoiced() {
    // a clinic with no funds refuses every patient
    let clinic = Arc::new(ClinicBuilder::new(1, ClinicSpecialty::Neurology).build());
    let insurer = Arc::new(Recorder::new(2, Role::Insurance));
    let hospital = Arc::new(
        HospitalBuilder::new(0, 35)
            .funds(1_000)
            .sick_patients(4)
            .clinics(vec![1])
            .insurer(2)
            .build(),
    );
    let dir = directory(vec![hospital.clone(), clinic.clone(), insurer.clone()]);

    let admitted = with_ctx(&dir, 1, |ctx| hospital.transfer_sick_patients_to_clinic(ctx)).unwrap();

    assert_eq!(admitted, 0);
    assert_eq!(hospital.sick_patients(), 4);
    assert_eq!(hospital.occupancy(), 4);
    assert!(insurer.invoices().is_empty());
}

#[test]
fn test_rehab_completes_after_rehab_days() {
    let insurer = Arc::new(Recorder::new(1, Role::Insurance));
    let hospital = Arc::new(
        HospitalBuilder::new(0, 35)
            .funds(1_000)
            .rehab_patients(3)
            .insurer(1)
            .build(),
    );
    let dir = directory(vec![hospital.clone(), insurer.clone()]);

    with_ctx(&dir, 1, |ctx| {
        for _ in 1..REHAB_DAYS {
            assert_eq!(hospital.update_rehab(ctx).unwrap(), 0);
        }
        assert_eq!(hospital.rehab_patients(), 3);
        assert_eq!(hospital.update_rehab(ctx).unwrap(), 3);
    });

    assert_eq!(hospital.rehab_patients(), 0);
    assert_eq!(hospital.freed(), 3);
    assert_eq!(hospital.patients(), 3);
    assert_eq!(hospital.occupancy(), 0);
    assert_eq!(insurer.invoices(), vec![(ServiceKind::Rehab.price_for(3), 0)]);
}

#[test]
fn test_rehab_admitted_later_finishes_later() {
    let insurer = Arc::new(Recorder::new(1, Role::Insurance));
    let hospital = Arc::new(
        HospitalBuilder::new(0, 35)
            .rehab_patients(1)
            .insurer(1)
            .build(),
    );
    let dir = directory(vec![hospital.clone(), insurer.clone()]);

    with_ctx(&dir, 1, |ctx| {
        hospital.update_rehab(ctx).unwrap();
        hospital.transfer(ItemKind::RehabPatient, 2).unwrap();
        for _ in 2..REHAB_DAYS {
            hospital.update_rehab(ctx).unwrap();
        }
        assert_eq!(hospital.update_rehab(ctx).unwrap(), 1);
        assert_eq!(hospital.update_rehab(ctx).unwrap(), 2);
    });
    assert_eq!(hospital.freed(), 3);
}

#[test]
fn test_nursing_staff_paid_per_bed() {
    let salary = EmployeeRole::NursingStaff.salary();
    let hospital = HospitalBuilder::new(0, 35).funds(1_000).build();

    assert_eq!(hospital.nursing_staff(), 35);
    assert_eq!(hospital.pay_nursing_staff(), 35);
    assert_eq!(hospital.funds(), 1_000 - 35 * salary);
    assert_eq!(hospital.employees_paid(), 35);
}

#[test]
fn test_nursing_pay_never_overdraws() {
    let salary = EmployeeRole::NursingStaff.salary();
    let hospital = HospitalBuilder::new(0, 35).funds(3 * salary + 1).build();

    assert_eq!(hospital.pay_nursing_staff(), 3);
    assert_eq!(hospital.funds(), 1);
    assert_eq!(hospital.pay_nursing_staff(), 0);
    assert_eq!(hospital.funds(), 1);
}

#[test]
fn test_broke_hospital_stops_admitting_sick() {
    let hospital = HospitalBuilder::new(0, 35).funds(2).build();
    assert_eq!(hospital.transfer(ItemKind::SickPatient, 1), Ok(1));

    hospital.pay_nursing_staff();
    assert_eq!(hospital.funds(), 0);
    assert_eq!(hospital.transfer(ItemKind::SickPatient, 1), Ok(0));
    assert_eq!(hospital.transfer(ItemKind::RehabPatient, 1), Ok(1));
}
