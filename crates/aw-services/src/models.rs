//! Response models.
//!
//! System attributes carry a `$` prefix on the wire (`$id`, `$createdAt`).
//! Fields the server may omit default so older servers still decode.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct File {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "bucketId")]
    pub bucket_id: String,
    #[serde(rename = "$createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "$updatedAt")]
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "$permissions", default)]
    pub permissions: Vec<String>,
    pub name: String,
    #[serde(default)]
    pub signature: String,
    #[serde(rename = "mimeType", default)]
    pub mime_type: String,
    #[serde(rename = "sizeOriginal")]
    pub size_original: u64,
    #[serde(rename = "chunksTotal")]
    pub chunks_total: u64,
    #[serde(rename = "chunksUploaded")]
    pub chunks_uploaded: u64,
}

impl File {
    /// Returns true once the server holds every chunk.
    pub fn is_complete(&self) -> bool {
        self.chunks_uploaded >= self.chunks_total
    }
}

/// A page of files.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FileList {
    pub total: u64,
    pub files: Vec<File>,
}

/// A site or function deployment.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Deployment {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "$createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "$updatedAt")]
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "type", default)]
    pub deployment_type: String,
    #[serde(rename = "resourceId")]
    pub resource_id: String,
    #[serde(rename = "resourceType", default)]
    pub resource_type: String,
    #[serde(default)]
    pub entrypoint: String,
    #[serde(rename = "sourceSize", default)]
    pub source_size: u64,
    #[serde(rename = "buildSize", default)]
    pub build_size: u64,
    #[serde(rename = "totalSize", default)]
    pub total_size: u64,
    #[serde(rename = "buildId", default)]
    pub build_id: String,
    #[serde(default)]
    pub activate: bool,
    #[serde(default)]
    pub status: String,
    #[serde(rename = "buildLogs", default)]
    pub build_logs: String,
    #[serde(rename = "buildDuration", default)]
    pub build_duration: u64,
    #[serde(rename = "chunksTotal", default)]
    pub chunks_total: u64,
    #[serde(rename = "chunksUploaded", default)]
    pub chunks_uploaded: u64,
}

/// A page of deployments.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeploymentList {
    pub total: u64,
    pub deployments: Vec<Deployment>,
}

/// A header sent to or returned from a function execution.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

/// A function execution.
///
/// Decodes from a JSON body as well as from a multipart body, where
/// `responseBody` arrives as a separate (possibly binary) part.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Execution {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "$createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "$updatedAt", default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(rename = "$permissions", default)]
    pub permissions: Vec<String>,
    #[serde(rename = "functionId", default)]
    pub function_id: String,
    #[serde(default)]
    pub trigger: String,
    #[serde(default)]
    pub status: String,
    #[serde(rename = "requestMethod", default)]
    pub request_method: String,
    #[serde(rename = "requestPath", default)]
    pub request_path: String,
    #[serde(rename = "requestHeaders", default)]
    pub request_headers: Vec<Header>,
    #[serde(rename = "responseStatusCode", default)]
    pub response_status_code: i64,
    #[serde(rename = "responseBody", default)]
    pub response_body: String,
    #[serde(rename = "responseHeaders", default)]
    pub response_headers: Vec<Header>,
    #[serde(default)]
    pub logs: String,
    #[serde(default)]
    pub errors: String,
    #[serde(default)]
    pub duration: f64,
    #[serde(rename = "scheduledAt", default)]
    pub scheduled_at: Option<String>,
}

/// A page of executions.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExecutionList {
    pub total: u64,
    pub executions: Vec<Execution>,
}

/// A short-lived JSON Web Token for the current user.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Jwt {
    pub jwt: String,
}

/// A login session.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Session {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "$createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(default)]
    pub expire: String,
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub ip: String,
    #[serde(rename = "clientName", default)]
    pub client_name: String,
    #[serde(rename = "countryCode", default)]
    pub country_code: String,
    #[serde(default)]
    pub current: bool,
    /// Only returned when the session is created with an API key.
    #[serde(default)]
    pub secret: String,
}

/// An account.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct User {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "$createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "$updatedAt")]
    pub updated_at: DateTime<Utc>,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub status: bool,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(rename = "emailVerification", default)]
    pub email_verification: bool,
    #[serde(rename = "phoneVerification", default)]
    pub phone_verification: bool,
    #[serde(default)]
    pub mfa: bool,
    #[serde(default)]
    pub prefs: serde_json::Map<String, serde_json::Value>,
}

/// A table row: system attributes plus the row's own columns.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Row {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "$tableId", default)]
    pub table_id: String,
    #[serde(rename = "$databaseId", default)]
    pub database_id: String,
    #[serde(rename = "$createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "$updatedAt", default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(rename = "$permissions", default)]
    pub permissions: Vec<String>,
    #[serde(flatten)]
    pub data: serde_json::Map<String, serde_json::Value>,
}

impl Row {
    /// A column value.
    pub fn get(&self, column: &str) -> Option<&serde_json::Value> {
        self.data.get(column)
    }
}

/// A page of rows.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RowList {
    pub total: u64,
    pub rows: Vec<Row>,
}
