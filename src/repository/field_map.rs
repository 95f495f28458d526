//! Field-name mapping between the internal (camelCase) and external
//! (snake_case column) naming conventions.
//!
//! Every rename at the remote boundary goes through the tables in this
//! module; nothing else in the crate spells out a column name.

use serde_json::{Map, Value};

use crate::error::{EngineError, EngineResult};

/// A remote table with its own column mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    /// Employee profiles.
    Employees,
    /// Payment records, keyed by `employee_id`.
    PaymentRecords,
}

/// Field name used for the owning employee on a payment record.
pub const EMPLOYEE_ID_FIELD: &str = "employeeId";

const EMPLOYEE_COLUMNS: &[(&str, &str)] = &[
    ("id", "id"),
    ("name", "name"),
    ("email", "email"),
    ("bankAccount", "bank_account"),
    ("bankAccountHolder", "bank_account_holder"),
    ("initialBudget", "initial_budget"),
    ("initialSalary", "initial_salary"),
];

const PAYMENT_RECORD_COLUMNS: &[(&str, &str)] = &[
    ("id", "id"),
    (EMPLOYEE_ID_FIELD, "employee_id"),
    ("date", "date"),
    ("initialBudget", "initial_budget"),
    ("currentBudget", "current_budget"),
    ("initialSalary", "initial_salary"),
    ("finalSalary", "final_salary"),
    ("budgetRatio", "budget_ratio"),
];

impl Table {
    /// The remote table name.
    pub fn name(&self) -> &'static str {
        match self {
            Table::Employees => "employees",
            Table::PaymentRecords => "payment_records",
        }
    }

    /// `(internal, external)` pairs for this table.
    pub fn columns(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Table::Employees => EMPLOYEE_COLUMNS,
            Table::PaymentRecords => PAYMENT_RECORD_COLUMNS,
        }
    }

    /// Maps an internal field name to its column.
    pub fn to_external(&self, field: &str) -> Option<&'static str> {
        self.columns()
            .iter()
            .find(|(internal, _)| *internal == field)
            .map(|(_, external)| *external)
    }

    /// Maps a column to its internal field name.
    pub fn to_internal(&self, column: &str) -> Option<&'static str> {
        self.columns()
            .iter()
            .find(|(_, external)| *external == column)
            .map(|(internal, _)| *internal)
    }

    /// Renames an internal JSON object to a row. Fields without a column
    /// (such as an employee's embedded history) are dropped.
    pub fn to_row(&self, value: Value) -> EngineResult<Map<String, Value>> {
        let object = into_object(value, self)?;
        Ok(object
            .into_iter()
            .filter_map(|(key, value)| {
                self.to_external(&key)
                    .map(|column| (column.to_string(), value))
            })
            .collect())
    }

    /// Renames a row to an internal JSON object. Unknown columns (such as
    /// server-side timestamps) are dropped.
    pub fn from_row(&self, row: Value) -> EngineResult<Map<String, Value>> {
        let object = into_object(row, self)?;
        Ok(object
            .into_iter()
            .filter_map(|(key, value)| {
                self.to_internal(&key)
                    .map(|field| (field.to_string(), value))
            })
            .collect())
    }
}

fn into_object(value: Value, table: &Table) -> EngineResult<Map<String, Value>> {
    match value {
        Value::Object(object) => Ok(object),
        other => Err(EngineError::Serialization {
            message: format!("expected a {} object, got {}", table.name(), other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bank_account_maps_both_ways() {
        assert_eq!(Table::Employees.to_external("bankAccount"), Some("bank_account"));
        assert_eq!(Table::Employees.to_internal("bank_account"), Some("bankAccount"));
    }

    #[test]
    fn test_every_column_maps_back() {
        for table in [Table::Employees, Table::PaymentRecords] {
            for (internal, external) in table.columns() {
                assert_eq!(table.to_external(internal), Some(*external));
                assert_eq!(table.to_internal(external), Some(*internal));
            }
        }
    }

    #[test]
    fn test_unknown_names_are_unmapped() {
        assert_eq!(Table::Employees.to_external("history"), None);
        assert_eq!(Table::Employees.to_internal("created_at"), None);
        assert_eq!(Table::Employees.to_external("employeeId"), None);
    }

    #[test]
    fn test_to_row_renames_and_drops_history() {
        let row = Table::Employees
            .to_row(json!({
                "id": "e1",
                "name": "A",
                "bankAccountHolder": "A",
                "history": []
            }))
            .unwrap();
        assert_eq!(row.get("bank_account_holder"), Some(&json!("A")));
        assert!(!row.contains_key("history"));
        assert!(!row.contains_key("bankAccountHolder"));
    }

    #[test]
    fn test_from_row_renames_and_drops_unknown_columns() {
        let object = Table::PaymentRecords
            .from_row(json!({
                "id": "p1",
                "employee_id": "e1",
                "final_salary": 10,
                "created_at": "2026-01-01T00:00:00Z"
            }))
            .unwrap();
        assert_eq!(object.get("employeeId"), Some(&json!("e1")));
        assert_eq!(object.get("finalSalary"), Some(&json!(10)));
        assert!(!object.contains_key("created_at"));
    }

    #[test]
    fn test_non_object_is_rejected() {
        let err = Table::Employees.from_row(json!([1, 2])).unwrap_err();
        assert!(matches!(err, EngineError::Serialization { .. }));
    }

    #[test]
    fn test_table_names() {
        assert_eq!(Table::Employees.name(), "employees");
        assert_eq!(Table::PaymentRecords.name(), "payment_records");
    }
}
