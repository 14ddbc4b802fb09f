use appwrite_sdk::services::{
    Account, CreateExecution, Functions, PreviewOptions, Storage, TablesDb, ID,
};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common;

#[tokio::test]
async fn test_sdk_headers_reach_the_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/account"))
        .and(header("x-sdk-name", "Rust"))
        .and(header("x-sdk-language", "rust"))
        .and(header("x-appwrite-project", "integration"))
        .and(header("x-appwrite-key", "integration-key"))
        .and(header("x-appwrite-response-format", appwrite_sdk::client::RESPONSE_FORMAT))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "$id": "u1",
            "$createdAt": "2024-06-01T12:00:00.000+00:00",
            "$updatedAt": "2024-06-01T12:00:00.000+00:00",
            "name": "Integration"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = common::client(&server, 1024);
    let user = Account::new(&client).get().await.unwrap();
    assert_eq!(user.name, "Integration");
}

#[tokio::test]
async fn test_file_lifecycle() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/storage/buckets/uploads/files"))
        .and(query_param("search", "data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "total": 1,
            "files": [common::file_json("f1", 3, 1, 1)]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/storage/buckets/uploads/files/f1/preview"))
        .and(query_param("width", "64"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"img".to_vec(), "image/png"))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v1/storage/buckets/uploads/files/f1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = common::client(&server, 1024);
    let storage = Storage::new(&client);

    let list = storage.list_files("uploads", None, Some("data")).await.unwrap();
    assert_eq!(list.files[0].id, "f1");

    let options = PreviewOptions {
        width: Some(64),
        ..Default::default()
    };
    let preview = storage
        .get_file_preview("uploads", "f1", &options)
        .await
        .unwrap();
    assert_eq!(&preview[..], b"img");

    storage.delete_file("uploads", "f1").await.unwrap();
}

#[tokio::test]
async fn test_execution_with_multipart_response() {
    let server = MockServer::start().await;
    let body = concat!(
        "--sep\r\n",
        "Content-Disposition: form-data; name=\"$id\"\r\n\r\n",
        "exec-1\r\n",
        "--sep\r\n",
        "Content-Disposition: form-data; name=\"responseStatusCode\"\r\n\r\n",
        "200\r\n",
        "--sep\r\n",
        "Content-Disposition: form-data; name=\"responseBody\"\r\n\r\n",
        "{\"resized\":true}\r\n",
        "--sep--\r\n",
    );
    Mock::given(method("POST"))
        .and(path("/v1/functions/resize/executions"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_raw(body.as_bytes().to_vec(), "multipart/form-data; boundary=sep"),
        )
        .mount(&server)
        .await;

    let client = common::client(&server, 1024);
    let execution = Functions::new(&client)
        .create_execution("resize", &CreateExecution::new().body("{}"))
        .await
        .unwrap();

    assert_eq!(execution.id, "exec-1");
    assert_eq!(execution.response_status_code, 200);
    assert_eq!(execution.response_body, "{\"resized\":true}");
}

#[tokio::test]
async fn test_row_round_trip_through_tablesdb() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/tablesdb/shop/tables/orders/rows"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "$id": "o1",
            "$tableId": "orders",
            "$databaseId": "shop",
            "$createdAt": "2024-06-01T12:00:00.000+00:00",
            "$updatedAt": "2024-06-01T12:00:00.000+00:00",
            "$permissions": [],
            "total": 42.5
        })))
        .mount(&server)
        .await;

    let client = common::client(&server, 1024);
    let row = TablesDb::new(&client)
        .create_row(
            "shop",
            "orders",
            &ID::unique(),
            serde_json::json!({"total": 42.5}),
            None,
        )
        .await
        .unwrap();
    assert_eq!(row.get("total"), Some(&serde_json::json!(42.5)));
}
