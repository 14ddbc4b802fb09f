//! Upload a file to an Appwrite storage bucket.
//!
//! ```sh
//! export APPWRITE_ENDPOINT='https://cloud.appwrite.io/v1'
//! export APPWRITE_PROJECT='my-project'
//! export APPWRITE_API_KEY='...'
//! cargo run --bin aw-upload -- photos ./holiday.mov
//! ```
//!
//! Pass a file id as third argument to resume an interrupted upload of that
//! file. Ctrl-C stops the upload before the next chunk.

use appwrite_sdk::services::{CancellationToken, Client, InputFile, Storage, UploadProgress, ID};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (bucket_id, path, file_id) = match args.as_slice() {
        [bucket, path] => (bucket.clone(), path.clone(), ID::unique()),
        [bucket, path, id] => (bucket.clone(), path.clone(), ID::custom(id.as_str())),
        _ => {
            eprintln!("Usage: aw-upload <bucket-id> <path> [file-id]");
            std::process::exit(2);
        }
    };

    let client = Client::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        eprintln!();
        eprintln!("  Set APPWRITE_ENDPOINT (and APPWRITE_PROJECT, APPWRITE_API_KEY).");
        std::process::exit(1);
    });

    let file = InputFile::from_path(&path).await.unwrap_or_else(|e| {
        eprintln!("Error: cannot read {path}: {e}");
        std::process::exit(1);
    });
    println!("Uploading {} ({} bytes) to bucket {bucket_id}", file.filename(), file.size());

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nStopping after the current chunk...");
            on_signal.cancel();
        }
    });

    let storage = Storage::new(&client).with_cancellation(cancel);
    let mut report = |p: UploadProgress| {
        println!(
            "  chunk {}/{}  {:>6.2}%  {} bytes  id={}",
            p.chunks_uploaded,
            p.chunks_total,
            p.progress,
            p.size_uploaded,
            p.id.as_deref().unwrap_or("-")
        );
    };

    match storage
        .create_file(&bucket_id, &file_id, file, None, Some(&mut report))
        .await
    {
        Ok(uploaded) => {
            println!("Done: {}", uploaded.id);
            match serde_json::to_string_pretty(&uploaded) {
                Ok(json) => println!("{json}"),
                Err(e) => tracing::warn!(error = %e, "Could not render file metadata"),
            }
        }
        Err(e) => {
            eprintln!("Upload failed: {e}");
            if let Some(code) = e.code() {
                eprintln!("  code: {code}, type: {}", e.error_type().unwrap_or_default());
            }
            std::process::exit(1);
        }
    }
}
