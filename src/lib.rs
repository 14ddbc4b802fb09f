//! # appwrite-sdk
//!
//! An Appwrite API client library for Rust.
//!
//! Large files are uploaded in fixed-size chunks that can be resumed after a
//! failure, with one chunk in memory at a time whatever the file size.
//!
//! ## Security
//!
//! - API keys, sessions and JWTs are redacted in Debug output
//! - Tracing spans skip credential parameters
//!
//! ## Crates
//!
//! - **appwrite-client** - Core transport: request encoding, response decoding, error mapping, chunked uploads
//! - **appwrite-services** - Service APIs: Account, Storage, Sites, Functions, TablesDB
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use appwrite_sdk::services::{Client, InputFile, Storage, ID};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // APPWRITE_ENDPOINT, APPWRITE_PROJECT, APPWRITE_API_KEY
//!     let client = Client::from_env()?;
//!
//!     let storage = Storage::new(&client);
//!     let file = InputFile::from_path("backup.tar.gz").await?;
//!     let uploaded = storage
//!         .create_file("backups", &ID::unique(), file, None, None)
//!         .await?;
//!
//!     println!("{} ({} bytes)", uploaded.id, uploaded.size_original);
//!     Ok(())
//! }
//! ```

// Re-export all crates for convenient access
pub use appwrite_client as client;
#[cfg(feature = "services")]
pub use appwrite_services as services;

pub use appwrite_client::{Client, Error, ErrorKind, Result};
