//! Tests for supplier production, sales and payments

mod common;

use common::{directory, with_ctx};
use health_economy_core::{
    Actor, ActorError, EmployeeRole, ItemKind, RngManager, SupplierBuilder, SupplierKind,
};
use std::sync::Arc;
use std::thread;

#[test]
fn test_daily_salary_injection_produces_one_unit_per_day() {
    let supplier = Arc::new(SupplierBuilder::new(0, vec![ItemKind::Pill]).build());
    let dir = directory(vec![supplier.clone()]);

    with_ctx(&dir, 42, |ctx| {
        for _ in 0..5 {
            supplier.pay(EmployeeRole::Supplier.salary()).unwrap();
            supplier.run_day(ctx).unwrap();
        }
    });

    assert_eq!(supplier.stock(ItemKind::Pill), 5);
    assert_eq!(supplier.employees_paid(), 5);
    assert_eq!(supplier.funds(), 0);
}

#[test]
fn test_no_production_without_salary() {
    let supplier = SupplierBuilder::new(0, vec![ItemKind::Pill])
        .funds(EmployeeRole::Supplier.salary() - 1)
        .build();
    let mut rng = RngManager::new(1);

    assert_eq!(supplier.produce(&mut rng), None);
    assert_eq!(supplier.stock(ItemKind::Pill), 0);
    assert_eq!(supplier.employees_paid(), 0);
}

#[test]
fn test_production_stays_in_catalog() {
    let supplier = SupplierBuilder::of_kind(0, SupplierKind::MedicalDevices)
        .funds(1_000)
        .build();
    let mut rng = RngManager::new(99);

    for _ in 0..50 {
        let item = supplier.produce(&mut rng).unwrap();
        assert!(SupplierKind::MedicalDevices.catalog().contains(&item));
    }
    let produced: u32 = supplier
        .catalog()
        .iter()
        .map(|item| supplier.stock(*item))
        .sum();
    assert_eq!(produced, 50);
}

#[test]
fn test_buy_sells_what_is_in_stock() {
    let supplier = SupplierBuilder::of_kind(0, SupplierKind::Pharmacy)
        .stock(ItemKind::Syringe, 2)
        .build();

    assert_eq!(
        supplier.buy(ItemKind::Syringe, 5),
        Ok(2 * ItemKind::Syringe.unit_price())
    );
    assert_eq!(supplier.buy(ItemKind::Syringe, 1), Ok(0));
    assert_eq!(supplier.buy(ItemKind::Pill, 1), Ok(0));
    // buying never moves money
    assert_eq!(supplier.funds(), 0);
}

#[test]
fn test_sells_reports_catalog() {
    let pharmacy = SupplierBuilder::of_kind(0, SupplierKind::Pharmacy).build();
    assert!(pharmacy.sells(ItemKind::Pill));
    assert!(pharmacy.sells(ItemKind::Syringe));
    assert!(!pharmacy.sells(ItemKind::Scalpel));
    assert!(!pharmacy.sells(ItemKind::SickPatient));
}

#[test]
fn test_negative_payment_rejected() {
    let supplier = SupplierBuilder::of_kind(0, SupplierKind::Pharmacy).funds(10).build();
    assert_eq!(supplier.pay(-3), Err(ActorError::InvalidAmount { amount: -3 }));
    assert_eq!(supplier.funds(), 10);
}

#[test]
fn test_concurrent_payments_are_not_lost() {
    const THREADS: usize = 8;
    const PAYMENTS: usize = 1_000;

    let supplier = Arc::new(SupplierBuilder::of_kind(0, SupplierKind::Pharmacy).build());
    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let supplier = Arc::clone(&supplier);
            thread::spawn(move || {
                for _ in 0..PAYMENTS {
                    supplier.pay(1).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(supplier.funds(), (THREADS * PAYMENTS) as i64);
}

#[test]
fn test_concurrent_buys_never_oversell() {
    let supplier = Arc::new(
        SupplierBuilder::of_kind(0, SupplierKind::Pharmacy)
            .stock(ItemKind::Pill, 100)
            .build(),
    );
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let supplier = Arc::clone(&supplier);
            thread::spawn(move || {
                let mut billed = 0;
                for _ in 0..30 {
                    billed += supplier.buy(ItemKind::Pill, 1).unwrap();
                }
                billed
            })
        })
        .collect();
    let billed: i64 = handles.into_iter().map(|h| h.join().unwrap()).sum();

    assert_eq!(billed, 100 * ItemKind::Pill.unit_price());
    assert_eq!(supplier.stock(ItemKind::Pill), 0);
}
