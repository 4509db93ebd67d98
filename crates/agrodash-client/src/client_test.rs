use super::*;

fn test_client(base_url: &str) -> BackendClient {
    BackendClient::with_base_url(base_url).expect("client construction should not fail")
}

#[test]
fn build_url_appends_path_and_actor() {
    let client = test_client("http://localhost:5000/api");
    let url = client
        .build_url("dashboard/metrics", &Actor::Id(42), &[])
        .unwrap();
    assert_eq!(
        url.as_str(),
        "http://localhost:5000/api/dashboard/metrics?actor=42"
    );
}

#[test]
fn build_url_strips_trailing_slash() {
    let client = test_client("http://localhost:5000/api/");
    let url = client
        .build_url("notifications", &Actor::Id(1), &[("role", "farmer")])
        .unwrap();
    assert_eq!(
        url.as_str(),
        "http://localhost:5000/api/notifications?actor=1&role=farmer"
    );
}

#[test]
fn build_url_encodes_email_actor() {
    let client = test_client("http://localhost:5000/api");
    let url = client
        .build_url(
            "alerts",
            &Actor::Email("asha+farm@agro.example".to_string()),
            &[],
        )
        .unwrap();
    assert!(
        url.as_str().ends_with("alerts?actor=asha%2Bfarm%40agro.example"),
        "email actor should be percent-encoded: {url}"
    );
}

#[test]
fn rejects_non_http_base_url() {
    let result = BackendClient::with_base_url("ftp://files.example");
    assert!(matches!(result, Err(ClientError::InvalidBaseUrl { .. })));
}

#[test]
fn rejects_unparseable_base_url() {
    let result = BackendClient::with_base_url("not a url");
    assert!(matches!(result, Err(ClientError::InvalidBaseUrl { .. })));
}

#[test]
fn error_envelope_is_rejected_with_its_message() {
    let body = serde_json::json!({"success": false, "message": "Database connection lost"});
    let err = BackendClient::check_api_error(&body, "getRecentOrders")
        .expect_err("success:false must fail");
    assert!(
        matches!(&err, ClientError::Api { message, .. } if message == "Database connection lost"),
        "got: {err:?}"
    );

    let nested = serde_json::json!({"error": {"message": "token expired"}});
    assert!(matches!(
        BackendClient::check_api_error(&nested, "getMetrics"),
        Err(ClientError::Api { message, .. }) if message == "token expired"
    ));
}

#[test]
fn ordinary_bodies_pass_the_error_check() {
    for body in [
        serde_json::json!([]),
        serde_json::json!({"success": true, "data": null}),
        serde_json::json!({"products": 3, "error": null}),
        serde_json::json!(null),
    ] {
        assert!(
            BackendClient::check_api_error(&body, "test").is_ok(),
            "rejected: {body}"
        );
    }
}
