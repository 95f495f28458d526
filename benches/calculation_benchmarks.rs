//! Performance benchmarks for the Salary Engine.
//!
//! Covers the bare calculation, a full report (validation, formatting,
//! breakdown and budget health) and the `/calculate` endpoint, plus a batch
//! of saved payments against the in-memory store.
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use salary_engine::api::{AppState, CalculationRequest, create_router};
use salary_engine::calculation::{SalaryReport, calculate_salary, validate_inputs};
use salary_engine::format::NumberLocale;
use salary_engine::license::EntitlementGate;
use salary_engine::models::{NewEmployee, SalaryInput};
use salary_engine::repository::{EmployeeRepository, LocalEmployeeStore};
use salary_engine::session::Session;
use salary_engine::storage::{KeyValueStore, MemoryKeyValueStore};

use axum::{body::Body, http::Request};
use rust_decimal::Decimal;
use tower::ServiceExt;

fn create_test_session() -> Session {
    let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryKeyValueStore::new());
    Session::new(
        EmployeeRepository::new(Arc::new(LocalEmployeeStore::new(Arc::clone(&kv)))),
        Arc::new(EntitlementGate::new(None, kv)),
        NumberLocale::VI_VN,
    )
}

fn worked_example() -> SalaryInput {
    SalaryInput::new(40_000_000.0, 35_000_000.0, 25_000_000.0)
}

/// Benchmark: the proportional calculation alone.
fn bench_calculate_salary(c: &mut Criterion) {
    let input = worked_example();
    c.bench_function("calculate_salary", |b| {
        b.iter(|| black_box(calculate_salary(black_box(&input))))
    });
}

/// Benchmark: validation plus the formatted report, per locale.
fn bench_report(c: &mut Criterion) {
    let input = worked_example();
    let result = calculate_salary(&input).unwrap();

    let mut group = c.benchmark_group("report");
    for (name, locale) in [("vi-VN", NumberLocale::VI_VN), ("en-US", NumberLocale::EN_US)] {
        group.bench_with_input(BenchmarkId::new("build", name), &locale, |b, locale| {
            b.iter(|| {
                let errors = validate_inputs(black_box(&input));
                black_box(errors);
                black_box(SalaryReport::build(&input, result, locale))
            })
        });
    }
    group.finish();
}

/// Benchmark: one `/calculate` request through the router.
fn bench_calculate_endpoint(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let router = create_router(AppState::new(create_test_session()));
    let request = CalculationRequest::new(40_000_000.0, 35_000_000.0, 25_000_000.0);
    let body = serde_json::to_string(&request).unwrap();

    c.bench_function("calculate_endpoint", |b| {
        b.to_async(&rt).iter(|| async {
            let router = router.clone();
            let response = router
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/calculate")
                        .header("Content-Type", "application/json")
                        .body(Body::from(body.clone()))
                        .unwrap(),
                )
                .await
                .unwrap();
            black_box(response)
        })
    });
}

/// Benchmark: saving 100 payments for one employee.
///
/// Each save rewrites the whole stored document, so this tracks how the
/// local store scales with history length.
fn bench_save_batch_100(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let inputs: Vec<SalaryInput> = (0..100)
        .map(|i| SalaryInput::new(40_000_000.0, 30_000_000.0 + f64::from(i) * 100_000.0, 25_000_000.0))
        .collect();

    let mut group = c.benchmark_group("payment_history");
    group.throughput(Throughput::Elements(100));
    group.sample_size(10);

    group.bench_function("save_100", |b| {
        b.to_async(&rt).iter(|| async {
            let session = create_test_session();
            let employee = session
                .repository()
                .create(NewEmployee {
                    name: "Benchmark".to_string(),
                    email: None,
                    bank_account: None,
                    bank_account_holder: None,
                    initial_budget: Decimal::from(40_000_000),
                    initial_salary: Decimal::from(25_000_000),
                })
                .await
                .unwrap();
            for input in &inputs {
                black_box(session.save_payment(employee.id, input).await.unwrap());
            }
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_calculate_salary,
    bench_report,
    bench_calculate_endpoint,
    bench_save_batch_100,
);
criterion_main!(benches);
