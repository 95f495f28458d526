use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::{Map, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{Employee, PaymentRecord};

use super::EmployeeStore;
use super::field_map::{EMPLOYEE_ID_FIELD, Table};

/// Upper bound on one request to the remote database.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// [`EmployeeStore`] backed by a PostgREST-style remote database.
///
/// Employees live in `/rest/v1/employees` and payment records in
/// `/rest/v1/payment_records`, joined on `employee_id`. The API key is sent
/// both as the `apikey` header and as a bearer token.
#[derive(Debug, Clone)]
pub struct RestEmployeeStore {
    client: Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl RestEmployeeStore {
    /// Creates a store for the service at `base_url`.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url, api_key)
    }

    /// Creates a store sharing an existing HTTP client.
    pub fn with_client(
        client: Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            api_key: api_key.into(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Replaces the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint(&self, table: Table) -> String {
        format!("{}/rest/v1/{}", self.base_url, table.name())
    }

    async fn send(&self, request: RequestBuilder, action: &str) -> EngineResult<Response> {
        let response = request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|err| EngineError::storage(format!("{}: {}", action, err)))?;
        response
            .error_for_status()
            .map_err(|err| EngineError::storage(format!("{}: {}", action, err)))
    }

    async fn fetch_rows(&self, table: Table, query: &[(&str, &str)]) -> EngineResult<Vec<Value>> {
        let request = self.client.get(self.endpoint(table)).query(query);
        let response = self.send(request, "fetch rows").await?;
        response
            .json::<Vec<Value>>()
            .await
            .map_err(|err| EngineError::Serialization {
                message: format!("invalid {} response: {}", table.name(), err),
            })
    }

    async fn insert_row(&self, table: Table, row: Map<String, Value>) -> EngineResult<()> {
        let request = self
            .client
            .post(self.endpoint(table))
            .header("Prefer", "return=minimal")
            .json(&row);
        self.send(request, "insert row").await?;
        Ok(())
    }
}

#[async_trait]
impl EmployeeStore for RestEmployeeStore {
    async fn load_employees(&self) -> EngineResult<Vec<Employee>> {
        let employee_rows = self.fetch_rows(Table::Employees, &[("select", "*")]).await?;
        let payment_rows = self
            .fetch_rows(
                Table::PaymentRecords,
                &[("select", "*"), ("order", "date.desc")],
            )
            .await?;
        debug!(
            employees = employee_rows.len(),
            payments = payment_rows.len(),
            "Fetched remote rows"
        );
        assemble(employee_rows, payment_rows)
    }

    async fn insert_employee(&self, employee: &Employee) -> EngineResult<()> {
        self.insert_row(Table::Employees, employee_row(employee)?).await
    }

    async fn update_employee(&self, employee: &Employee) -> EngineResult<()> {
        let filter = format!("eq.{}", employee.id);
        let request = self
            .client
            .patch(self.endpoint(Table::Employees))
            .query(&[("id", filter.as_str())])
            .header("Prefer", "return=minimal")
            .json(&employee_row(employee)?);
        self.send(request, "update row").await?;
        Ok(())
    }

    async fn insert_payment(&self, employee_id: Uuid, record: &PaymentRecord) -> EngineResult<()> {
        self.insert_row(Table::PaymentRecords, payment_row(employee_id, record)?)
            .await
    }
}

fn employee_row(employee: &Employee) -> EngineResult<Map<String, Value>> {
    Table::Employees.to_row(serde_json::to_value(employee)?)
}

fn payment_row(employee_id: Uuid, record: &PaymentRecord) -> EngineResult<Map<String, Value>> {
    let mut value = serde_json::to_value(record)?;
    if let Value::Object(object) = &mut value {
        object.insert(
            EMPLOYEE_ID_FIELD.to_string(),
            Value::String(employee_id.to_string()),
        );
    }
    Table::PaymentRecords.to_row(value)
}

/// Builds employees from remote rows, attaching each payment record to its
/// owner with the newest first.
fn assemble(employee_rows: Vec<Value>, payment_rows: Vec<Value>) -> EngineResult<Vec<Employee>> {
    let mut employees = employee_rows
        .into_iter()
        .map(|row| {
            let object = Table::Employees.from_row(row)?;
            Ok(serde_json::from_value::<Employee>(Value::Object(object))?)
        })
        .collect::<EngineResult<Vec<_>>>()?;

    for row in payment_rows {
        let mut object = Table::PaymentRecords.from_row(row)?;
        let owner = object
            .remove(EMPLOYEE_ID_FIELD)
            .ok_or_else(|| EngineError::Serialization {
                message: "payment record without employee_id".to_string(),
            })?;
        let owner: Uuid = serde_json::from_value(owner)?;
        let record: PaymentRecord = serde_json::from_value(Value::Object(object))?;

        match employees.iter_mut().find(|e| e.id == owner) {
            Some(employee) => employee.history.push(record),
            None => warn!(employee_id = %owner, record_id = %record.id, "Skipping orphaned payment record"),
        }
    }

    for employee in &mut employees {
        employee.history.sort_by(|a, b| b.date.cmp(&a.date));
    }
    Ok(employees)
}
