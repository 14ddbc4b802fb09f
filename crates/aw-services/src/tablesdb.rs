//! The TablesDB service: rows of database tables.

use tracing::instrument;

use appwrite_client::path::fill;
use appwrite_client::{Client, Headers, Params, RequestMethod, ResponseType, Result};

use crate::models::{Row, RowList};
use crate::{json_headers, require, with_list};

/// TablesDB API.
#[derive(Debug, Clone)]
pub struct TablesDb {
    client: Client,
}

impl TablesDb {
    pub fn new(client: &Client) -> Self {
        Self {
            client: client.clone(),
        }
    }

    /// List the rows of a table.
    #[instrument(skip(self))]
    pub async fn list_rows(
        &self,
        database_id: &str,
        table_id: &str,
        queries: Option<&[String]>,
    ) -> Result<RowList> {
        let path = rows_path(database_id, table_id)?;
        self.client
            .call(
                RequestMethod::Get,
                &path,
                Headers::new(),
                with_list(Params::new(), "queries", queries),
                ResponseType::Json,
            )
            .await?
            .json()
    }

    /// Create a row. `data` must be a JSON object of column values.
    #[instrument(skip(self, data))]
    pub async fn create_row(
        &self,
        database_id: &str,
        table_id: &str,
        row_id: &str,
        data: serde_json::Value,
        permissions: Option<&[String]>,
    ) -> Result<Row> {
        require("rowId", row_id)?;
        let path = rows_path(database_id, table_id)?;
        let params = Params::new().with("rowId", row_id).with("data", data);
        let params = with_list(params, "permissions", permissions);

        self.client
            .call(
                RequestMethod::Post,
                &path,
                json_headers(),
                params,
                ResponseType::Json,
            )
            .await?
            .json()
    }

    #[instrument(skip(self))]
    pub async fn get_row(
        &self,
        database_id: &str,
        table_id: &str,
        row_id: &str,
        queries: Option<&[String]>,
    ) -> Result<Row> {
        let path = row_path(database_id, table_id, row_id)?;
        self.client
            .call(
                RequestMethod::Get,
                &path,
                Headers::new(),
                with_list(Params::new(), "queries", queries),
                ResponseType::Json,
            )
            .await?
            .json()
    }

    /// Update some columns of a row. Omitted columns are left as they are.
    #[instrument(skip(self, data))]
    pub async fn update_row(
        &self,
        database_id: &str,
        table_id: &str,
        row_id: &str,
        data: Option<serde_json::Value>,
        permissions: Option<&[String]>,
    ) -> Result<Row> {
        let path = row_path(database_id, table_id, row_id)?;
        let params = with_list(Params::new().with_opt("data", data), "permissions", permissions);

        self.client
            .call(
                RequestMethod::Patch,
                &path,
                json_headers(),
                params,
                ResponseType::Json,
            )
            .await?
            .json()
    }

    #[instrument(skip(self))]
    pub async fn delete_row(&self, database_id: &str, table_id: &str, row_id: &str) -> Result<()> {
        let path = row_path(database_id, table_id, row_id)?;
        self.client
            .call(
                RequestMethod::Delete,
                &path,
                json_headers(),
                Params::new(),
                ResponseType::Json,
            )
            .await?;
        Ok(())
    }
}

fn rows_path(database_id: &str, table_id: &str) -> Result<String> {
    require("databaseId", database_id)?;
    require("tableId", table_id)?;
    fill(
        "/tablesdb/{databaseId}/tables/{tableId}/rows",
        &[("databaseId", database_id), ("tableId", table_id)],
    )
}

fn row_path(database_id: &str, table_id: &str, row_id: &str) -> Result<String> {
    require("databaseId", database_id)?;
    require("tableId", table_id)?;
    require("rowId", row_id)?;
    fill(
        "/tablesdb/{databaseId}/tables/{tableId}/rows/{rowId}",
        &[
            ("databaseId", database_id),
            ("tableId", table_id),
            ("rowId", row_id),
        ],
    )
}
