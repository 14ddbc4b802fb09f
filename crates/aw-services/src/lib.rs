//! # appwrite-services
//!
//! Typed service APIs on top of `appwrite-client`.
//!
//! ## Features
//!
//! - **Account** - Current user, email sessions, JWTs, OAuth2 tokens
//! - **Storage** - Chunked, resumable file uploads; downloads and previews
//! - **Sites** - Chunked deployment uploads and deployment management
//! - **Functions** - Deployments and executions (JSON or multipart results)
//! - **TablesDB** - Row CRUD
//!
//! Every service wraps a cloned [`Client`]. Required parameters are checked
//! before any request is sent.
//!
//! ## Example
//!
//! ```rust,ignore
//! use appwrite_services::{Client, InputFile, Storage, ID};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), appwrite_services::Error> {
//!     let client = Client::from_env()?;
//!     let storage = Storage::new(&client);
//!
//!     let file = InputFile::from_path("video.mp4").await?;
//!     let mut report = |p: appwrite_services::UploadProgress| {
//!         println!("{:.1}%", p.progress);
//!     };
//!     let uploaded = storage
//!         .create_file("videos", &ID::unique(), file, None, Some(&mut report))
//!         .await?;
//!     println!("uploaded {}", uploaded.id);
//!
//!     Ok(())
//! }
//! ```

mod account;
mod functions;
mod id;
pub mod models;
mod sites;
mod storage;
mod tablesdb;

pub use account::Account;
pub use functions::{CreateExecution, Functions};
pub use id::ID;
pub use sites::{CreateSiteDeployment, DeploymentDownloadType, Sites};
pub use storage::{PreviewOptions, Storage};
pub use tablesdb::TablesDb;

// Re-export client types that users need to drive a service
pub use appwrite_client::{
    CancellationToken, Client, ClientConfig, ClientConfigBuilder, Error, ErrorKind, InputFile,
    ProgressCallback, Result, UploadProgress,
};

use appwrite_client::{Headers, Params};

/// Reject an empty required parameter before any network activity.
pub(crate) fn require(name: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::missing_parameter(name));
    }
    Ok(())
}

/// Per-call headers for requests with a JSON body.
pub(crate) fn json_headers() -> Headers {
    Headers::new().with("content-type", "application/json")
}

/// Add `key` as an array parameter when the list is present.
pub(crate) fn with_list(params: Params, key: &str, values: Option<&[String]>) -> Params {
    params.with_opt(key, values.map(<[String]>::to_vec))
}
