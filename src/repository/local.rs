use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{Employee, PaymentRecord};
use crate::storage::KeyValueStore;

use super::EmployeeStore;

/// Key the employee collection is stored under.
pub const EMPLOYEES_KEY: &str = "miniERP_employees";

/// Key an unreadable employee document is moved to.
pub const CORRUPT_EMPLOYEES_KEY: &str = "miniERP_employees_corrupt";

/// [`EmployeeStore`] keeping the whole collection, histories included, as
/// one JSON document in a [`KeyValueStore`].
///
/// A document that no longer parses is moved to [`CORRUPT_EMPLOYEES_KEY`]
/// and the collection starts over empty, so later writes succeed.
pub struct LocalEmployeeStore {
    kv: Arc<dyn KeyValueStore>,
    // Read-modify-write of the document must not interleave.
    document: Mutex<()>,
}

impl LocalEmployeeStore {
    /// Creates a store over `kv`.
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kv,
            document: Mutex::new(()),
        }
    }

    async fn read(&self) -> EngineResult<Vec<Employee>> {
        let Some(text) = self.kv.get(EMPLOYEES_KEY).await? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&text) {
            Ok(employees) => Ok(employees),
            Err(err) => {
                self.kv.set(CORRUPT_EMPLOYEES_KEY, &text).await?;
                self.kv.remove(EMPLOYEES_KEY).await?;
                warn!(
                    error = %err,
                    moved_to = CORRUPT_EMPLOYEES_KEY,
                    "Employee document is unreadable, starting empty"
                );
                Ok(Vec::new())
            }
        }
    }

    async fn write(&self, employees: &[Employee]) -> EngineResult<()> {
        let text = serde_json::to_string(employees)?;
        self.kv.set(EMPLOYEES_KEY, &text).await?;
        debug!(count = employees.len(), "Saved employee collection");
        Ok(())
    }
}

#[async_trait]
impl EmployeeStore for LocalEmployeeStore {
    async fn load_employees(&self) -> EngineResult<Vec<Employee>> {
        let _document = self.document.lock().await;
        self.read().await
    }

    async fn insert_employee(&self, employee: &Employee) -> EngineResult<()> {
        let _document = self.document.lock().await;
        let mut employees = self.read().await?;
        employees.push(employee.clone());
        self.write(&employees).await
    }

    async fn update_employee(&self, employee: &Employee) -> EngineResult<()> {
        let _document = self.document.lock().await;
        let mut employees = self.read().await?;
        let slot = employees
            .iter_mut()
            .find(|e| e.id == employee.id)
            .ok_or(EngineError::EmployeeNotFound { id: employee.id })?;
        // History is only ever extended through insert_payment.
        let history = std::mem::take(&mut slot.history);
        *slot = Employee {
            history,
            ..employee.clone()
        };
        self.write(&employees).await
    }

    async fn insert_payment(&self, employee_id: Uuid, record: &PaymentRecord) -> EngineResult<()> {
        let _document = self.document.lock().await;
        let mut employees = self.read().await?;
        let employee = employees
            .iter_mut()
            .find(|e| e.id == employee_id)
            .ok_or(EngineError::EmployeeNotFound { id: employee_id })?;
        employee.history.insert(0, record.clone());
        self.write(&employees).await
    }
}
