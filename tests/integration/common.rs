use appwrite_sdk::client::{multipart, Client, ClientConfig};
use wiremock::MockServer;

/// A client for `server` with a small chunk size so uploads stay fast.
pub fn client(server: &MockServer, chunk_size: usize) -> Client {
    let config = ClientConfig::builder()
        .with_chunk_size(chunk_size)
        .build();
    let mut client = Client::with_config(config).expect("client should build");
    client
        .set_endpoint(format!("{}/v1", server.uri()))
        .expect("mock endpoint is valid")
        .set_project("integration")
        .set_key("integration-key");
    client
}

pub fn header(request: &wiremock::Request, name: &str) -> Option<String> {
    request
        .headers
        .get(name)
        .map(|v| v.to_str().expect("ascii header").to_string())
}

/// Decode the multipart form a request carried.
pub fn form_fields(request: &wiremock::Request) -> multipart::MultipartFields {
    let content_type = header(request, "content-type").expect("content-type header");
    let boundary =
        multipart::boundary_from_content_type(&content_type).expect("multipart boundary");
    multipart::parse(&request.body, &boundary).expect("well-formed multipart body")
}

pub fn file_json(id: &str, size: u64, chunks_total: u64, chunks_uploaded: u64) -> serde_json::Value {
    serde_json::json!({
        "$id": id,
        "bucketId": "uploads",
        "$createdAt": "2024-06-01T12:00:00.000+00:00",
        "$updatedAt": "2024-06-01T12:00:00.000+00:00",
        "$permissions": [],
        "name": "data.bin",
        "signature": "",
        "mimeType": "application/octet-stream",
        "sizeOriginal": size,
        "chunksTotal": chunks_total,
        "chunksUploaded": chunks_uploaded
    })
}
