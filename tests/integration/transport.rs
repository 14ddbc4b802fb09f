use appwrite_sdk::client::{Headers, Params, RequestMethod, ResponseBody, ResponseType};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common;

#[tokio::test]
async fn test_get_flattens_nested_params_into_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/items"))
        .and(query_param("filters[0][field]", "status"))
        .and(query_param("filters[0][value]", "open"))
        .and(query_param("limit", "25"))
        .and(query_param("archived", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"total": 0})))
        .expect(1)
        .mount(&server)
        .await;

    let client = common::client(&server, 1024);
    let filter = Params::new().with("field", "status").with("value", "open");
    let params = Params::new()
        .with("filters", vec![filter])
        .with("limit", 25)
        .with("archived", false);

    let body = client
        .call(
            RequestMethod::Get,
            "/items",
            Headers::new(),
            params,
            ResponseType::Json,
        )
        .await
        .unwrap();
    assert_eq!(body.u64_field("total"), Some(0));

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].body.is_empty());
}

#[tokio::test]
async fn test_post_sends_json_body_and_merged_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/items"))
        .and(header("x-appwrite-project", "override"))
        .and(header("x-appwrite-key", "integration-key"))
        .and(body_json(serde_json::json!({
            "name": "widget",
            "tags": ["a", "b"],
            "meta": {"weight": 1.5}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"$id": "i1"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = common::client(&server, 1024);
    let params = Params::new()
        .with("name", "widget")
        .with("tags", vec!["a", "b"])
        .with("meta", Params::new().with("weight", 1.5));

    let body = client
        .call(
            RequestMethod::Post,
            "/items",
            Headers::new()
                .with("Content-Type", "application/json")
                .with("X-Appwrite-Project", "override"),
            params,
            ResponseType::Json,
        )
        .await
        .unwrap();
    assert_eq!(body.id(), Some("i1"));
}

#[tokio::test]
async fn test_plain_text_error_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;

    let client = common::client(&server, 1024);
    let err = client
        .call(
            RequestMethod::Get,
            "/missing",
            Headers::new(),
            Params::new(),
            ResponseType::Json,
        )
        .await
        .unwrap_err();

    assert!(err.is_api());
    assert_eq!(err.code(), Some(404));
    assert_eq!(err.message(), "not found");
    assert_eq!(err.error_type(), Some(""));
    assert_eq!(err.response(), Some("not found"));
}

#[tokio::test]
async fn test_warning_header_does_not_fail_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/health"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-appwrite-warning", "deprecated; slow down")
                .set_body_json(serde_json::json!({"status": "pass"})),
        )
        .mount(&server)
        .await;

    let client = common::client(&server, 1024);
    let body = client
        .call(
            RequestMethod::Get,
            "/health",
            Headers::new(),
            Params::new(),
            ResponseType::Json,
        )
        .await
        .unwrap();
    assert_eq!(body.str_field("status"), Some("pass"));
}

#[tokio::test]
async fn test_location_response_is_not_followed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/redirect"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "https://example.com/next"))
        .mount(&server)
        .await;

    let client = common::client(&server, 1024);
    let body = client
        .call(
            RequestMethod::Get,
            "/redirect",
            Headers::new(),
            Params::new(),
            ResponseType::Location,
        )
        .await
        .unwrap();
    assert_eq!(body, ResponseBody::Location("https://example.com/next".to_string()));
}

#[tokio::test]
async fn test_unreachable_server_is_a_network_error() {
    let server = MockServer::start().await;
    let mut client = common::client(&server, 1024);
    client.set_endpoint("http://127.0.0.1:9/v1").unwrap();

    let err = client
        .call(
            RequestMethod::Get,
            "/health",
            Headers::new(),
            Params::new(),
            ResponseType::Json,
        )
        .await
        .unwrap_err();
    assert!(err.is_network());
    assert_eq!(err.code(), None);
}
