use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use appwrite_sdk::client::multipart::MultipartValue;
use appwrite_sdk::client::{
    Headers, InputFile, Params, RequestMethod, UploadOptions, UploadProgress,
};
use appwrite_sdk::services::{Storage, ID};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common;

const MIB: usize = 1024 * 1024;

/// Mounts a files endpoint that reports one more uploaded chunk per request.
async fn mount_counting_upload(server: &MockServer, size: u64, chunks_total: u64) {
    let calls = Arc::new(AtomicU64::new(0));
    Mock::given(method("POST"))
        .and(path("/v1/storage/buckets/uploads/files"))
        .respond_with(move |_: &wiremock::Request| {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            ResponseTemplate::new(201).set_body_json(common::file_json(
                "server-id",
                size,
                chunks_total,
                n,
            ))
        })
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_twelve_mib_file_from_disk() {
    let server = MockServer::start().await;
    let size = 12 * MIB;
    mount_counting_upload(&server, size as u64, 3).await;

    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("data.bin");
    let content: Vec<u8> = (0..size).map(|i| (i % 251) as u8).collect();
    tokio::fs::write(&file_path, &content).await.unwrap();

    let client = common::client(&server, 5 * MIB);
    let storage = Storage::new(&client);
    let mut events: Vec<UploadProgress> = Vec::new();
    let mut on_progress = |p: UploadProgress| events.push(p);

    let file = storage
        .create_file(
            "uploads",
            &ID::unique(),
            InputFile::from_path(&file_path).await.unwrap(),
            None,
            Some(&mut on_progress),
        )
        .await
        .unwrap();
    assert_eq!(file.id, "server-id");
    assert!(file.is_complete());

    let requests = server.received_requests().await.unwrap();
    let ranges: Vec<Option<String>> = requests
        .iter()
        .map(|r| common::header(r, "content-range"))
        .collect();
    assert_eq!(
        ranges,
        vec![
            Some("bytes 0-5242879/12582912".to_string()),
            Some("bytes 5242880-10485759/12582912".to_string()),
            Some("bytes 10485760-12582911/12582912".to_string()),
        ]
    );
    assert_eq!(common::header(&requests[0], "x-appwrite-id"), None);
    assert_eq!(
        common::header(&requests[1], "x-appwrite-id").as_deref(),
        Some("server-id")
    );

    // Each request carries exactly its slice, plus the fileId field
    let mut offset = 0;
    for request in &requests {
        let fields = common::form_fields(request);
        assert_eq!(
            fields.get("fileId"),
            Some(&MultipartValue::Text("unique()".to_string()))
        );
        // Untyped parts decode as lossy text
        let start = offset;
        let end = (offset + 5 * MIB).min(size);
        let expected = String::from_utf8_lossy(&content[start..end]).into_owned();
        assert_eq!(fields.get("file"), Some(&MultipartValue::Text(expected)));
        offset = end;
    }

    let percents: Vec<f64> = events.iter().map(|e| e.progress).collect();
    assert_eq!(events.len(), 3);
    assert!(percents.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(*percents.last().unwrap(), 100.0);
    assert_eq!(
        events.iter().map(|e| e.chunks_uploaded).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
}

#[tokio::test]
async fn test_resume_from_existing_file() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/storage/buckets/uploads/files/report"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(common::file_json("report", 40, 4, 3)),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/storage/buckets/uploads/files"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(common::file_json("report", 40, 4, 4)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = common::client(&server, 10);
    let storage = Storage::new(&client);
    let content = b"0000000000111111111122222222223333333333".to_vec();

    let file = storage
        .create_file(
            "uploads",
            "report",
            InputFile::from_bytes(content, "report.txt"),
            None,
            None,
        )
        .await
        .unwrap();
    assert_eq!(file.chunks_uploaded, 4);

    let requests = server.received_requests().await.unwrap();
    let post = requests
        .iter()
        .find(|r| r.method.as_str() == "POST")
        .unwrap();
    assert_eq!(
        common::header(post, "content-range").as_deref(),
        Some("bytes 30-39/40")
    );
    assert_eq!(common::header(post, "x-appwrite-id").as_deref(), Some("report"));
    assert_eq!(
        common::form_fields(post).get("file"),
        Some(&MultipartValue::Text("3333333333".to_string()))
    );
}

#[tokio::test]
async fn test_raw_chunked_upload_with_reader_source() {
    let server = MockServer::start().await;
    mount_counting_upload(&server, 7, 1).await;

    let client = common::client(&server, 1024);
    let reader = std::io::Cursor::new(b"payload".to_vec());
    let body = client
        .chunked_upload(
            RequestMethod::Post,
            "/storage/buckets/uploads/files",
            Headers::new(),
            Params::new().with("fileId", "raw"),
            "file",
            InputFile::from_reader(reader, 7, "payload.txt").with_mime_type("text/plain"),
            UploadOptions::new(),
            None,
        )
        .await
        .unwrap();
    assert_eq!(body.id(), Some("server-id"));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(common::header(&requests[0], "content-range"), None);
}
