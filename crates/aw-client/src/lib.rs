//! # appwrite-client
//!
//! Core HTTP transport for Appwrite APIs.
//!
//! This crate provides:
//! - A configured [`Client`] holding the endpoint and default headers
//! - Request encoding: query strings, JSON bodies and multipart forms
//! - Response decoding: JSON, raw bytes, redirect locations and multipart
//! - Error mapping from Appwrite error bodies
//! - Chunked, resumable uploads with progress reporting
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Service Layer                            │
//! │  (appwrite-services: account, storage, sites, functions)    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Client                               │
//! │  - Endpoint + default headers (project, key, session)       │
//! │  - call() / send() and chunked_upload()                     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    HttpTransport                            │
//! │  - Body encoding per method and content type                │
//! │  - Warning logging, error mapping, response decoding        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use appwrite_client::{Client, Params, RequestMethod, Headers, ResponseType};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), appwrite_client::Error> {
//!     let mut client = Client::new()?;
//!     client
//!         .set_endpoint("https://cloud.appwrite.io/v1")?
//!         .set_project("my-project")
//!         .set_key("secret");
//!
//!     let files = client
//!         .call(
//!             RequestMethod::Get,
//!             "/storage/buckets/photos/files",
//!             Headers::new(),
//!             Params::new().with("search", "cat"),
//!             ResponseType::Json,
//!         )
//!         .await?;
//!
//!     println!("{:?}", files.as_json());
//!     Ok(())
//! }
//! ```

mod appwrite_client;
mod client;
mod config;
mod error;
pub mod multipart;
mod params;
pub mod path;
mod request;
mod response;
mod upload;

pub use appwrite_client::{headers, Client};
pub use client::HttpTransport;
pub use config::{ClientConfig, ClientConfigBuilder};
pub use error::{Error, ErrorKind, Result};
pub use params::{FilePayload, FlatValue, Params, Value};
pub use request::{Headers, Request, RequestMethod};
pub use response::{ResponseBody, ResponseType, WARNING_HEADER};
pub use upload::{
    ChunkPlan, ChunkRange, InputFile, ProgressCallback, UploadOptions, UploadProgress,
};

pub use tokio_util::sync::CancellationToken;

/// Default chunk size for uploads (5 MiB).
pub const DEFAULT_CHUNK_SIZE: usize = 5 * 1024 * 1024;

/// Endpoint used until [`Client::set_endpoint`] is called.
pub const DEFAULT_ENDPOINT: &str = "https://cloud.appwrite.io/v1";

/// Response format version requested from the server.
pub const RESPONSE_FORMAT: &str = "1.7.0";

/// User-Agent string for the client
pub const USER_AGENT: &str = concat!("appwrite-rust-sdk/", env!("CARGO_PKG_VERSION"));
