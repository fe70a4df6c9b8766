//! Data tables: user-defined extension tables attached to core entities.
//!
//! Entries are free-form rows, so they are returned as raw JSON maps keyed by
//! column name.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::{ApiError, Result};
use crate::handler::RequestHandler;
use crate::object::{echoes_id, make_resources, path_segment, Fields, FromJson, Resource};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DataTableColumn {
    pub name: Option<String>,
    pub column_type: Option<String>,
    pub display_type: Option<String>,
    pub length: Option<i64>,
    pub nullable: Option<bool>,
    pub primary_key: Option<bool>,
    pub code: Option<String>,
}

impl FromJson for DataTableColumn {
    fn from_json(data: &Value) -> Self {
        let f = Fields::new(data);
        Self {
            name: f.string("columnName"),
            column_type: f.string("columnType"),
            display_type: f.string("columnDisplayType"),
            length: f.i64("columnLength"),
            nullable: f.bool("isColumnNullable"),
            primary_key: f.bool("isColumnPrimaryKey"),
            code: f.string("columnCode"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DataTable {
    handler: Arc<RequestHandler>,
    pub name: Option<String>,
    pub application_table_name: Option<String>,
    pub columns: Option<Vec<DataTableColumn>>,
}

impl Resource for DataTable {
    fn from_response(handler: &Arc<RequestHandler>, data: &Value) -> Self {
        let f = Fields::new(data);
        Self {
            handler: Arc::clone(handler),
            name: f.string("registeredTableName"),
            application_table_name: f.string("applicationTableName"),
            columns: f.list("columnHeaderData"),
        }
    }
}

impl DataTable {
    pub fn get(handler: &Arc<RequestHandler>, name: &str) -> Result<Self> {
        let data = handler.get(&format!("/datatables/{}", path_segment(name)), &[])?;
        Ok(Self::from_response(handler, &data))
    }

    /// Registered data tables, optionally only those extending `apptable`
    /// (e.g. `m_client`).
    pub fn list(handler: &Arc<RequestHandler>, apptable: Option<&str>) -> Result<Vec<Self>> {
        let params: Vec<(&str, String)> = apptable
            .map(|table| vec![("apptable", table.to_string())])
            .unwrap_or_default();
        let data = handler.get("/datatables", &params)?;
        Ok(make_resources(handler, &data))
    }

    fn entry_path(&self, apptable_id: i64) -> Result<String> {
        let name = self
            .name
            .as_deref()
            .ok_or(ApiError::MissingField("registeredTableName"))?;
        Ok(format!("/datatables/{}/{apptable_id}", path_segment(name)))
    }

    /// Rows stored for one application-table record.
    pub fn entries(&self, apptable_id: i64) -> Result<Vec<Map<String, Value>>> {
        let data = self.handler.get(
            &self.entry_path(apptable_id)?,
            &[("genericResultSet", "false".to_string())],
        )?;
        let rows = data
            .as_array()
            .map(|rows| rows.iter().filter_map(|row| row.as_object().cloned()).collect())
            .unwrap_or_default();
        Ok(rows)
    }

    pub fn add_entry(&self, apptable_id: i64, row: Map<String, Value>) -> Result<bool> {
        let response = self
            .handler
            .post(&self.entry_path(apptable_id)?, &Value::Object(row))?;
        Ok(echoes_id(&response, "resourceId", apptable_id))
    }

    pub fn update_entry(&self, apptable_id: i64, row: Map<String, Value>) -> Result<bool> {
        let response = self
            .handler
            .put(&self.entry_path(apptable_id)?, &Value::Object(row))?;
        Ok(echoes_id(&response, "resourceId", apptable_id))
    }

    pub fn delete_entries(&self, apptable_id: i64) -> Result<bool> {
        let response = self.handler.delete(&self.entry_path(apptable_id)?)?;
        Ok(echoes_id(&response, "resourceId", apptable_id))
    }
}
