//! Integration tests for the Salary Engine.
//!
//! This test suite covers:
//! - Salary calculation through the HTTP API
//! - Input validation
//! - Locale formatting of reports
//! - Employee persistence and payment history on disk
//! - Backend failures leaving state unchanged
//! - License gating of the history view

use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use salary_engine::api::{AppState, create_router};
use salary_engine::error::{EngineError, EngineResult};
use salary_engine::format::NumberLocale;
use salary_engine::license::{
    EntitlementGate, LICENSE_KEY_KEY, LICENSE_STATUS_KEY, LicenseAuthority, LicenseVerdict,
};
use salary_engine::models::{Employee, NewEmployee, PaymentRecord, SalaryInput};
use salary_engine::repository::{EmployeeRepository, EmployeeStore, LocalEmployeeStore};
use salary_engine::session::{Session, Validated};
use salary_engine::storage::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};

// =============================================================================
// Test Helpers
// =============================================================================

fn decimal(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn memory_session(locale: NumberLocale, authority: Option<Arc<dyn LicenseAuthority>>) -> Session {
    let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryKeyValueStore::new());
    Session::new(
        EmployeeRepository::new(Arc::new(LocalEmployeeStore::new(Arc::clone(&kv)))),
        Arc::new(EntitlementGate::new(authority, kv)),
        locale,
    )
}

fn create_router_for_test() -> Router {
    create_router(AppState::new(memory_session(NumberLocale::VI_VN, None)))
}

async fn request(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");
    let body = body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty);

    let response = router
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

async fn post_calculate(router: &Router, initial_budget: Value, current_budget: Value, initial_salary: Value) -> (StatusCode, Value) {
    request(
        router,
        "POST",
        "/calculate",
        Some(json!({
            "initialBudget": initial_budget,
            "currentBudget": current_budget,
            "initialSalary": initial_salary
        })),
    )
    .await
}

fn new_employee(name: &str) -> NewEmployee {
    NewEmployee {
        name: name.to_string(),
        email: Some("employee@example.com".to_string()),
        bank_account: Some("0011-2233-4455".to_string()),
        bank_account_holder: Some(name.to_uppercase()),
        initial_budget: decimal("40000000"),
        initial_salary: decimal("25000000"),
    }
}

fn error_fields(body: &Value) -> Vec<String> {
    body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap().to_string())
        .collect()
}

/// Authority that accepts exactly one key.
struct SingleKeyAuthority {
    key: &'static str,
    reachable: AtomicBool,
}

impl SingleKeyAuthority {
    fn new(key: &'static str) -> Arc<Self> {
        Arc::new(Self {
            key,
            reachable: AtomicBool::new(true),
        })
    }
}

#[async_trait]
impl LicenseAuthority for SingleKeyAuthority {
    async fn check(&self, key: &str) -> EngineResult<LicenseVerdict> {
        if !self.reachable.load(Ordering::SeqCst) {
            return Err(EngineError::LicenseServer {
                message: "connection refused".to_string(),
            });
        }
        let valid = key == self.key;
        Ok(LicenseVerdict {
            valid,
            message: if valid { String::new() } else { "License not found.".to_string() },
            client_name: valid.then(|| "Acme Construction".to_string()),
        })
    }
}

/// Store whose writes can be switched to fail.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryKeyValueStore,
    failing: AtomicBool,
}

impl FlakyStore {
    fn local(&self) -> LocalEmployeeStore {
        LocalEmployeeStore::new(Arc::new(self.inner.clone()))
    }

    fn check(&self) -> EngineResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(EngineError::storage("backend offline"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl EmployeeStore for FlakyStore {
    async fn load_employees(&self) -> EngineResult<Vec<Employee>> {
        self.check()?;
        self.local().load_employees().await
    }

    async fn insert_employee(&self, employee: &Employee) -> EngineResult<()> {
        self.check()?;
        self.local().insert_employee(employee).await
    }

    async fn update_employee(&self, employee: &Employee) -> EngineResult<()> {
        self.check()?;
        self.local().update_employee(employee).await
    }

    async fn insert_payment(&self, employee_id: Uuid, record: &PaymentRecord) -> EngineResult<()> {
        self.check()?;
        self.local().insert_payment(employee_id, record).await
    }
}

// =============================================================================
// SECTION 1: Calculation through the API
// =============================================================================

#[tokio::test]
async fn test_worked_example_budget_decrease() {
    let router = create_router_for_test();
    let (status, body) = post_calculate(&router, json!(40_000_000), json!(35_000_000), json!(25_000_000)).await;

    assert_eq!(status, StatusCode::OK);
    let result = &body["result"];
    assert_eq!(decimal(result["budgetRatio"].as_str().unwrap()), decimal("0.875"));
    assert_eq!(decimal(result["currentSalary"].as_str().unwrap()), decimal("21875000"));
    assert_eq!(decimal(result["budgetChange"].as_str().unwrap()), decimal("-12.5"));
    assert_eq!(decimal(result["salaryDifference"].as_str().unwrap()), decimal("-3125000"));
    assert_eq!(result["status"], "decrease");
    assert_eq!(body["formatted"]["statusLabel"], "Budget Decreased");
    assert_eq!(body["health"]["band"], "below");
}

#[tokio::test]
async fn test_budget_increase() {
    let router = create_router_for_test();
    let (status, body) = post_calculate(&router, json!(30_000_000), json!(45_000_000), json!(20_000_000)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal(body["result"]["currentSalary"].as_str().unwrap()), decimal("30000000"));
    assert_eq!(decimal(body["result"]["budgetChange"].as_str().unwrap()), decimal("50"));
    assert_eq!(body["result"]["status"], "increase");
    assert_eq!(body["health"]["band"], "over");
    assert_eq!(decimal(body["health"]["fillPercent"].as_str().unwrap()), decimal("100"));
    assert_eq!(body["breakdown"]["summary"], "10.000.000\u{a0}₫ more than original");
}

#[tokio::test]
async fn test_budget_unchanged() {
    let router = create_router_for_test();
    let (status, body) = post_calculate(&router, json!(1000), json!(1000), json!(500)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["status"], "unchanged");
    assert_eq!(decimal(body["result"]["salaryDifference"].as_str().unwrap()), Decimal::ZERO);
    assert_eq!(body["breakdown"]["summary"], "No change from original salary");
    assert_eq!(body["health"]["band"], "on_target");
}

#[tokio::test]
async fn test_repeating_ratio_is_rounded() {
    let router = create_router_for_test();
    let (status, body) = post_calculate(&router, json!(3), json!(1), json!(100)).await;

    assert_eq!(status, StatusCode::OK);
    let result = &body["result"];
    assert_eq!(decimal(result["budgetRatio"].as_str().unwrap()), decimal("0.3333"));
    assert_eq!(decimal(result["currentSalary"].as_str().unwrap()), decimal("33.33"));
    assert_eq!(decimal(result["budgetChange"].as_str().unwrap()), decimal("-66.67"));
    assert_eq!(decimal(result["salaryDifference"].as_str().unwrap()), decimal("-66.67"));
    assert_eq!(body["health"]["band"], "critical");
}

#[tokio::test]
async fn test_zero_current_budget_zeroes_salary() {
    let router = create_router_for_test();
    let (status, body) = post_calculate(&router, json!(100), json!(0), json!(50)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal(body["result"]["currentSalary"].as_str().unwrap()), Decimal::ZERO);
    assert_eq!(decimal(body["result"]["budgetChange"].as_str().unwrap()), decimal("-100"));
}

#[tokio::test]
async fn test_text_amounts_are_parsed_like_a_form() {
    let router = create_router_for_test();
    let (status, body) = post_calculate(&router, json!("40000000"), json!("35,000,000 ₫"), json!("25000000")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal(body["result"]["currentSalary"].as_str().unwrap()), decimal("21875000"));
}

// =============================================================================
// SECTION 2: Validation
// =============================================================================

#[tokio::test]
async fn test_zero_initial_budget_reports_two_errors() {
    let router = create_router_for_test();
    let (status, body) = post_calculate(&router, json!(0), json!(10), json!(10)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(error_fields(&body), vec!["initialBudget", "initialBudget"]);
    assert_eq!(
        body["errors"][1]["message"],
        "Initial Budget cannot be zero (division by zero)."
    );
}

#[tokio::test]
async fn test_every_invalid_field_is_reported_in_order() {
    let router = create_router_for_test();
    let (status, body) = post_calculate(&router, json!(-5), json!(-1), json!(-2)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        error_fields(&body),
        vec!["initialBudget", "currentBudget", "initialSalary"]
    );
}

#[tokio::test]
async fn test_unparsable_text_becomes_zero_and_is_rejected() {
    let router = create_router_for_test();
    let (status, body) = post_calculate(&router, json!("n/a"), json!("100"), json!("50")).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_fields(&body), vec!["initialBudget", "initialBudget"]);
}

#[test]
fn test_non_finite_input_is_rejected_by_session() {
    let session = memory_session(NumberLocale::VI_VN, None);
    let outcome = session.calculate(&SalaryInput::new(f64::NAN, f64::INFINITY, 1.0));

    match outcome {
        Validated::Invalid(errors) => {
            let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
            assert_eq!(fields, vec!["initialBudget", "currentBudget"]);
        }
        Validated::Valid(_) => panic!("non-finite input must be rejected"),
    }
}

// =============================================================================
// SECTION 3: Locale formatting
// =============================================================================

#[test]
fn test_report_formatting_vi_vn() {
    let session = memory_session(NumberLocale::VI_VN, None);
    let report = session
        .calculate(&SalaryInput::new(40_000_000.0, 35_000_000.0, 25_000_000.0))
        .valid()
        .unwrap();

    assert_eq!(report.formatted.current_salary, "21.875.000\u{a0}₫");
    assert_eq!(report.formatted.salary_difference, "-3.125.000\u{a0}₫");
    assert_eq!(report.formatted.budget_ratio, "87.50%");
    assert_eq!(report.health.display_percent, "87.5%");
}

#[test]
fn test_report_formatting_en_us() {
    let session = memory_session(NumberLocale::EN_US, None);
    let report = session
        .calculate(&SalaryInput::new(40_000_000.0, 35_000_000.0, 25_000_000.0))
        .valid()
        .unwrap();

    assert_eq!(report.formatted.current_salary, "₫21,875,000");
    assert_eq!(report.breakdown.summary, "₫3,125,000 less than original");
    assert_eq!(
        report.breakdown.steps[2].expression,
        "Difference = ₫21,875,000 − ₫25,000,000 = -₫3,125,000"
    );
}

// =============================================================================
// SECTION 4: Employees and payment history on disk
// =============================================================================

#[tokio::test]
async fn test_history_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let open = || {
        let kv: Arc<dyn KeyValueStore> = Arc::new(FileKeyValueStore::new(dir.path()));
        EmployeeRepository::new(Arc::new(LocalEmployeeStore::new(kv)))
    };

    let repository = open();
    let employee = repository.create(new_employee("Nguyen Van A")).await.unwrap();
    let input = SalaryInput::new(40_000_000.0, 35_000_000.0, 25_000_000.0);
    let result = salary_engine::calculation::calculate_salary(&input).unwrap();
    let first = repository.append_payment(employee.id, &input, &result).await.unwrap();
    let second = repository.append_payment(employee.id, &input, &result).await.unwrap();

    let reopened = open();
    assert_eq!(reopened.load().await.unwrap(), 1);
    let history = reopened.history(employee.id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].id, second.id);
    assert_eq!(history[1].id, first.id);
    assert_eq!(history[0].final_salary, decimal("21875000"));

    let stored = reopened.get(employee.id).await.unwrap();
    assert_eq!(stored.bank_account.as_deref(), Some("0011-2233-4455"));
}

#[tokio::test]
async fn test_employee_ids_are_unique() {
    let session = memory_session(NumberLocale::VI_VN, None);
    let mut ids = Vec::new();
    for i in 0..20 {
        let employee = session
            .repository()
            .create(new_employee(&format!("Employee {}", i)))
            .await
            .unwrap();
        ids.push(employee.id);
    }
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 20);
}

// =============================================================================
// SECTION 5: Backend failures
// =============================================================================

#[tokio::test]
async fn test_failing_backend_leaves_state_unchanged() {
    let store = Arc::new(FlakyStore::default());
    let repository = EmployeeRepository::new(store.clone());
    let employee = repository.create(new_employee("A")).await.unwrap();
    let before = repository.list().await;

    store.failing.store(true, Ordering::SeqCst);
    let input = SalaryInput::new(100.0, 80.0, 50.0);
    let result = salary_engine::calculation::calculate_salary(&input).unwrap();

    assert!(repository.create(new_employee("B")).await.is_err());
    assert!(repository.append_payment(employee.id, &input, &result).await.is_err());
    assert!(repository.load().await.is_err());
    assert_eq!(repository.list().await, before);

    store.failing.store(false, Ordering::SeqCst);
    repository.append_payment(employee.id, &input, &result).await.unwrap();
    assert_eq!(repository.history(employee.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_failing_backend_returns_500_through_api() {
    let store = Arc::new(FlakyStore::default());
    store.failing.store(true, Ordering::SeqCst);
    let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryKeyValueStore::new());
    let session = Session::new(
        EmployeeRepository::new(store),
        Arc::new(EntitlementGate::new(None, kv)),
        NumberLocale::VI_VN,
    );
    let router = create_router(AppState::new(session));

    let (status, body) = request(
        &router,
        "POST",
        "/employees",
        Some(json!({ "name": "A", "initialBudget": 1, "initialSalary": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "STORAGE_ERROR");

    let (_, employees) = request(&router, "GET", "/employees", None).await;
    assert!(employees.as_array().unwrap().is_empty());
}

// =============================================================================
// SECTION 6: License gating
// =============================================================================

#[tokio::test]
async fn test_license_unlocks_history() {
    let authority = SingleKeyAuthority::new("GOOD-KEY");
    let router = create_router(AppState::new(memory_session(
        NumberLocale::VI_VN,
        Some(authority),
    )));

    let (_, employee) = request(
        &router,
        "POST",
        "/employees",
        Some(json!({ "name": "A", "initialBudget": 100, "initialSalary": 50 })),
    )
    .await;
    let history = format!("/employees/{}/history", employee["id"].as_str().unwrap());

    let (status, _) = request(&router, "GET", &history, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = request(&router, "POST", "/license", Some(json!({ "key": "BAD-KEY" }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "License not found.");

    let (status, body) = request(&router, "POST", "/license", Some(json!({ "key": "GOOD-KEY" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isLicensed"], true);
    assert_eq!(body["clientName"], "Acme Construction");

    let (status, body) = request(&router, "GET", &history, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_cached_license_survives_unreachable_authority() {
    let authority = SingleKeyAuthority::new("GOOD-KEY");
    authority.reachable.store(false, Ordering::SeqCst);

    let kv = MemoryKeyValueStore::new();
    kv.set(LICENSE_KEY_KEY, "GOOD-KEY").await.unwrap();
    kv.set(LICENSE_STATUS_KEY, "valid").await.unwrap();
    let gate = EntitlementGate::new(Some(authority), Arc::new(kv));

    assert!(gate.restore().await.unwrap());
    gate.revalidate().await.unwrap();
    assert!(gate.ensure_licensed().await.is_ok());
}

#[tokio::test]
async fn test_revoked_cached_license_is_dropped() {
    let authority = SingleKeyAuthority::new("NEW-KEY");
    let kv = MemoryKeyValueStore::new();
    kv.set(LICENSE_KEY_KEY, "OLD-KEY").await.unwrap();
    kv.set(LICENSE_STATUS_KEY, "valid").await.unwrap();
    let gate = Arc::new(EntitlementGate::new(Some(authority), Arc::new(kv.clone())));

    assert!(gate.restore().await.unwrap());
    gate.spawn_revalidation().await.unwrap();

    let status = gate.status().await;
    assert!(!status.is_licensed);
    assert_eq!(status.error.as_deref(), Some("License not found."));
    assert_eq!(kv.get(LICENSE_KEY_KEY).await.unwrap(), None);
}
