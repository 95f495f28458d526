//! Employee repository for the Salary Engine.
//!
//! [`EmployeeRepository`] owns the in-memory employee collection and the
//! current selection, and writes every change through an
//! [`EmployeeStore`] backend. A mutation is computed on a copy, persisted,
//! and only then committed to memory, so a failed write leaves the
//! repository exactly as it was.
//!
//! Two backends are provided: [`LocalEmployeeStore`] keeps the collection
//! as one JSON document in a [`KeyValueStore`](crate::storage::KeyValueStore),
//! and [`RestEmployeeStore`] talks to a PostgREST-style remote database
//! whose column names are translated by [`field_map`].

pub mod field_map;
mod local;
mod rest;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{Employee, EmployeeUpdate, NewEmployee, PaymentRecord, SalaryInput, SalaryResult};

pub use local::{CORRUPT_EMPLOYEES_KEY, EMPLOYEES_KEY, LocalEmployeeStore};
pub use rest::RestEmployeeStore;

/// Persistence backend for employees and their payment records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmployeeStore: Send + Sync {
    /// Loads every employee with its history, newest record first.
    async fn load_employees(&self) -> EngineResult<Vec<Employee>>;

    /// Persists a newly created employee.
    async fn insert_employee(&self, employee: &Employee) -> EngineResult<()>;

    /// Persists changed profile fields of an existing employee.
    async fn update_employee(&self, employee: &Employee) -> EngineResult<()>;

    /// Persists a new payment record for `employee_id`.
    async fn insert_payment(&self, employee_id: Uuid, record: &PaymentRecord) -> EngineResult<()>;
}

#[derive(Debug, Default)]
struct RepositoryState {
    employees: Vec<Employee>,
    current_id: Option<Uuid>,
}

impl RepositoryState {
    fn find(&self, id: Uuid) -> EngineResult<&Employee> {
        self.employees
            .iter()
            .find(|e| e.id == id)
            .ok_or(EngineError::EmployeeNotFound { id })
    }

    fn replace(&mut self, employee: Employee) {
        if let Some(slot) = self.employees.iter_mut().find(|e| e.id == employee.id) {
            *slot = employee;
        }
    }
}

/// The employee collection plus the current selection.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use rust_decimal::Decimal;
/// use salary_engine::models::NewEmployee;
/// use salary_engine::repository::{EmployeeRepository, LocalEmployeeStore};
/// use salary_engine::storage::MemoryKeyValueStore;
///
/// # #[tokio::main]
/// # async fn main() {
/// let store = LocalEmployeeStore::new(Arc::new(MemoryKeyValueStore::new()));
/// let repository = EmployeeRepository::new(Arc::new(store));
///
/// let employee = repository
///     .create(NewEmployee {
///         name: "Nguyen Van A".to_string(),
///         email: None,
///         bank_account: None,
///         bank_account_holder: None,
///         initial_budget: Decimal::from(50_000_000),
///         initial_salary: Decimal::from(25_000_000),
///     })
///     .await
///     .unwrap();
///
/// assert_eq!(repository.current().await.map(|e| e.id), Some(employee.id));
/// # }
/// ```
pub struct EmployeeRepository {
    store: Arc<dyn EmployeeStore>,
    state: RwLock<RepositoryState>,
    // Serializes mutations so each one sees the result of the previous.
    writes: Mutex<()>,
}

impl EmployeeRepository {
    /// Creates an empty repository over `store`. Call [`load`](Self::load)
    /// to read existing employees.
    pub fn new(store: Arc<dyn EmployeeStore>) -> Self {
        Self {
            store,
            state: RwLock::new(RepositoryState::default()),
            writes: Mutex::new(()),
        }
    }

    /// Replaces the in-memory collection with the backend's contents and
    /// returns the number of employees loaded.
    ///
    /// On failure the in-memory collection is left untouched. A selection
    /// that no longer exists is cleared.
    pub async fn load(&self) -> EngineResult<usize> {
        let _write = self.writes.lock().await;
        let employees = self.store.load_employees().await.inspect_err(|err| {
            warn!(error = %err, "Failed to load employees");
        })?;

        let mut state = self.state.write().await;
        if let Some(current) = state.current_id {
            if !employees.iter().any(|e| e.id == current) {
                state.current_id = None;
            }
        }
        state.employees = employees;

        let count = state.employees.len();
        info!(count, "Loaded employees");
        Ok(count)
    }

    /// Creates an employee, persists it, and makes it the current selection.
    pub async fn create(&self, new: NewEmployee) -> EngineResult<Employee> {
        let employee = Employee::create(new)?;

        let _write = self.writes.lock().await;
        self.store.insert_employee(&employee).await.inspect_err(|err| {
            warn!(error = %err, "Failed to persist new employee");
        })?;

        let mut state = self.state.write().await;
        state.employees.push(employee.clone());
        state.current_id = Some(employee.id);

        info!(employee_id = %employee.id, "Created employee");
        Ok(employee)
    }

    /// Applies a partial update to employee `id`.
    pub async fn update(&self, id: Uuid, update: EmployeeUpdate) -> EngineResult<Employee> {
        let _write = self.writes.lock().await;
        let updated = self.state.read().await.find(id)?.with_update(update)?;

        self.store.update_employee(&updated).await.inspect_err(|err| {
            warn!(employee_id = %id, error = %err, "Failed to persist employee update");
        })?;
        self.state.write().await.replace(updated.clone());

        info!(employee_id = %id, "Updated employee");
        Ok(updated)
    }

    /// Records a calculation as a payment for employee `id`. The new record
    /// becomes the first entry of the history.
    pub async fn append_payment(
        &self,
        id: Uuid,
        input: &SalaryInput,
        result: &SalaryResult,
    ) -> EngineResult<PaymentRecord> {
        let _write = self.writes.lock().await;
        let employee = self.state.read().await.find(id)?.clone();
        let record = PaymentRecord::from_calculation(input, result, Utc::now())?;

        self.store.insert_payment(id, &record).await.inspect_err(|err| {
            warn!(employee_id = %id, error = %err, "Failed to persist payment record");
        })?;
        self.state.write().await.replace(employee.with_payment(record.clone()));

        info!(
            employee_id = %id,
            record_id = %record.id,
            final_salary = %record.final_salary,
            "Saved payment record"
        );
        Ok(record)
    }

    /// All employees in creation order.
    pub async fn list(&self) -> Vec<Employee> {
        self.state.read().await.employees.clone()
    }

    /// The employee with `id`, if any.
    pub async fn get(&self, id: Uuid) -> Option<Employee> {
        self.state.read().await.find(id).ok().cloned()
    }

    /// The payment history of employee `id`, newest first.
    pub async fn history(&self, id: Uuid) -> EngineResult<Vec<PaymentRecord>> {
        Ok(self.state.read().await.find(id)?.history.clone())
    }

    /// Sets the current selection. `None` clears it; an unknown id fails
    /// with [`EngineError::EmployeeNotFound`] and keeps the old selection.
    pub async fn select(&self, id: Option<Uuid>) -> EngineResult<Option<Employee>> {
        let mut state = self.state.write().await;
        let selected = match id {
            Some(id) => Some(state.find(id)?.clone()),
            None => None,
        };
        state.current_id = id;
        Ok(selected)
    }

    /// The currently selected employee, if any.
    pub async fn current(&self) -> Option<Employee> {
        let state = self.state.read().await;
        state.current_id.and_then(|id| state.find(id).ok().cloned())
    }
}
