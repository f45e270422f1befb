use serde_json::json;
use std::sync::Arc;
use toronto_ckan::{CkanClient, CkanError, Configuration, DatastoreQuery};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper function to create a client pointed at the mock server
fn create_test_client(server: &MockServer) -> CkanClient {
    let config = Configuration::default().with_base_path(format!("{}/api/3", server.uri()));
    CkanClient::new(Arc::new(config))
}

/// Test that we can create a client and it has expected debug output
#[test]
fn test_client_creation() {
    let client = CkanClient::new(Arc::new(Configuration::default()));

    let debug_str = format!("{:?}", client);
    assert!(debug_str.contains("CkanClient"));
    assert!(debug_str.contains("prod-toronto.ca"));
}

/// Test that error messages are distinct per failure class
#[test]
fn test_error_messages() {
    let api_error = CkanError::ApiError {
        status: 404,
        message: "Not found".to_string(),
    };
    assert_eq!(api_error.to_string(), "HTTP Error: 404: Not found");

    let action_error = CkanError::ActionError {
        message: "Dataset not found".to_string(),
    };
    assert!(action_error.to_string().contains("Dataset not found"));

    let request_error = CkanError::RequestError(Box::new(std::io::Error::other("refused")));
    assert_eq!(request_error.to_string(), "URL Error: refused");

    let parse_error = CkanError::ParseError(
        serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err(),
    );
    assert!(parse_error.to_string().starts_with("Error: "));

    fn check_error_trait<T: std::error::Error>(_: T) {}
    check_error_trait(api_error);
}

#[tokio::test]
async fn test_package_show_unwraps_envelope() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/3/action/package_show"))
        .and(query_param("id", "dinesafe"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "help": "https://ckan0.cf.opendata.inter.prod-toronto.ca/api/3/action/help_show?name=package_show",
            "success": true,
            "result": {
                "name": "dinesafe",
                "title": "DineSafe",
                "notes": "Restaurant inspections",
                "organization": {"title": "Toronto Public Health"},
                "resources": [
                    {"id": "r1", "name": "DineSafe", "format": "CSV", "datastore_active": true},
                    {"id": "r2", "name": "readme", "format": "XLSX", "datastore_active": false}
                ]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_test_client(&server);
    let package = client.package_show("dinesafe").await.unwrap();

    assert_eq!(package.display_title(), "DineSafe");
    assert_eq!(package.resources.len(), 2);
    assert!(package.resources[0].is_live());
    assert!(!package.resources[1].is_live());
}

#[tokio::test]
async fn test_datastore_search_sends_structured_filters() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/3/action/datastore_search"))
        .and(query_param("id", "r1"))
        .and(query_param("limit", "5"))
        .and(query_param("filters", r#"{"establishment_status":"Pass"}"#))
        .and(query_param("fields", "establishment_name,inspection_date"))
        .and(query_param("sort", "inspection_date desc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "result": {
                "fields": [
                    {"id": "_id", "type": "int"},
                    {"id": "establishment_name", "type": "text"},
                    {"id": "inspection_date", "type": "date"}
                ],
                "records": [
                    {"_id": 1, "establishment_name": "Joe's Pizza", "inspection_date": "2024-01-01"}
                ],
                "total": 1
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut filters = serde_json::Map::new();
    filters.insert("establishment_status".into(), json!("Pass"));
    let query = DatastoreQuery::new("r1")
        .with_limit(5)
        .with_filters(filters)
        .with_fields(vec!["establishment_name".into(), "inspection_date".into()])
        .with_sort("inspection_date desc");

    let client = create_test_client(&server);
    let result = client.datastore_search(&query).await.unwrap();

    assert_eq!(result.total, Some(1));
    assert_eq!(result.records.len(), 1);
    assert_eq!(result.records[0]["establishment_name"], json!("Joe's Pizza"));
}

#[tokio::test]
async fn test_package_search_passes_query_verbatim() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/3/action/package_search"))
        .and(query_param("q", "Traffic Signals"))
        .and(query_param("rows", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "result": {"count": 1, "results": [{"name": "traffic-signals", "title": "Traffic Signals"}]}
        })))
        .mount(&server)
        .await;

    let client = create_test_client(&server);
    let result = client.package_search("Traffic Signals", Some(3)).await.unwrap();

    assert_eq!(result.count, Some(1));
    assert_eq!(result.results[0].name, "traffic-signals");
}

#[tokio::test]
async fn test_package_list() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/3/action/package_list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "result": ["dinesafe", "traffic-signals"]
        })))
        .mount(&server)
        .await;

    let client = create_test_client(&server);
    let names = client.package_list().await.unwrap();
    assert_eq!(names, vec!["dinesafe", "traffic-signals"]);
}

#[tokio::test]
async fn test_non_success_status_keeps_code_and_ckan_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/3/action/datastore_search"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "success": false,
            "error": {
                "__type": "Validation Error",
                "filters": ["field \"nope\" not in resource"]
            }
        })))
        .mount(&server)
        .await;

    let client = create_test_client(&server);
    let err = client
        .datastore_search(&DatastoreQuery::new("r1"))
        .await
        .unwrap_err();

    match &err {
        CkanError::ApiError { status, message } => {
            assert_eq!(*status, 409);
            assert!(message.contains("nope"));
        }
        other => panic!("expected ApiError, got {other:?}"),
    }
    assert!(err.to_string().starts_with("HTTP Error: 409"));
}

#[tokio::test]
async fn test_plain_http_error_without_envelope() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("<html>nope</html>"))
        .mount(&server)
        .await;

    let client = create_test_client(&server);
    let err = client.package_list().await.unwrap_err();
    assert_eq!(err.to_string(), "HTTP Error: 404");
}

#[tokio::test]
async fn test_success_false_envelope_is_action_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": {"message": "Not found", "__type": "Not Found Error"}
        })))
        .mount(&server)
        .await;

    let client = create_test_client(&server);
    let err = client.package_show("missing").await.unwrap_err();
    assert!(matches!(err, CkanError::ActionError { ref message } if message == "Not found"));
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = create_test_client(&server);
    let err = client.package_list().await.unwrap_err();
    assert!(matches!(err, CkanError::ParseError(_)));
}

#[tokio::test]
async fn test_connection_failure_is_request_error() {
    // Nothing listens on the discard port
    let config = Configuration::default().with_base_path("http://127.0.0.1:9/api/3");
    let client = CkanClient::new(Arc::new(config));

    let err = client.package_list().await.unwrap_err();
    assert!(matches!(err, CkanError::RequestError(_)));
    assert!(err.to_string().starts_with("URL Error:"));
}

#[tokio::test]
async fn test_request_error_text_omits_query_string() {
    let config = Configuration::default().with_base_path("http://127.0.0.1:9/api/3");
    let client = CkanClient::new(Arc::new(config));

    let query = DatastoreQuery::new("r1").with_fields(vec!["name".to_string()]);
    let err = client.datastore_search(&query).await.unwrap_err();

    assert!(matches!(err, CkanError::RequestError(_)));
    let text = err.to_string();
    assert!(!text.contains("fields="), "{text}");
    assert!(!text.contains("datastore_search"), "{text}");
}
