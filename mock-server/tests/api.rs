use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Report, BROKEN_PATH, DATA_PATH, UNAVAILABLE_PATH};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn get(uri: &str, headers: &[(&str, &str)]) -> Request<String> {
    let mut builder = Request::builder().method("GET").uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(String::new()).unwrap()
}

const LEGACY: &[(&str, &str)] = &[
    ("Authorization", "GoogleLogin auth=valid-token"),
    ("GData-Version", "3"),
];

// --- success ---

#[tokio::test]
async fn legacy_token_gets_report() {
    let resp = app()
        .oneshot(get(&format!("{DATA_PATH}?ids=ga:123&key=test-key"), LEGACY))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let report: Report = body_json(resp).await;
    assert_eq!(report.ids, "ga:123");
    assert_eq!(report.authorization, "GoogleLogin auth=valid-token");
    assert_eq!(report.gdata_version.as_deref(), Some("3"));
    assert_eq!(report.query.get("key").map(String::as_str), Some("test-key"));
    assert_eq!(report.rows.len(), 1);
}

#[tokio::test]
async fn bearer_token_gets_report() {
    let resp = app()
        .oneshot(get(
            &format!("{DATA_PATH}?ids=ga:123"),
            &[("Authorization", "Bearer valid-token")],
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let report: Report = body_json(resp).await;
    assert!(report.gdata_version.is_none());
}

// --- structured errors ---

#[tokio::test]
async fn missing_credentials_returns_401_body() {
    let resp = app()
        .oneshot(get(&format!("{DATA_PATH}?ids=ga:123"), &[]))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["error"]["code"], 401);
    assert_eq!(body["error"]["message"], "Invalid Credentials");
    assert_eq!(body["error"]["errors"][0]["reason"], "authError");
}

#[tokio::test]
async fn legacy_token_without_version_is_rejected() {
    let resp = app()
        .oneshot(get(
            &format!("{DATA_PATH}?ids=ga:123"),
            &[("Authorization", "GoogleLogin auth=valid-token")],
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn missing_ids_returns_400_body() {
    let resp = app().oneshot(get(DATA_PATH, LEGACY)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["error"]["code"], 400);
    assert_eq!(body["error"]["errors"][0], "ids is required");
}

#[tokio::test]
async fn wrong_api_key_returns_400_body() {
    let resp = app()
        .oneshot(get(&format!("{DATA_PATH}?ids=ga:123&key=nope"), LEGACY))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["error"]["errors"][0], "keyInvalid");
}

#[tokio::test]
async fn forbidden_profile_returns_403_body() {
    let resp = app()
        .oneshot(get(&format!("{DATA_PATH}?ids=ga:forbidden"), LEGACY))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["error"]["code"], 403);
}

#[tokio::test]
async fn unavailable_returns_503_body() {
    let resp = app().oneshot(get(UNAVAILABLE_PATH, &[])).await.unwrap();

    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["error"]["code"], 503);
}

// --- unstructured error ---

#[tokio::test]
async fn broken_returns_plain_text() {
    let resp = app().oneshot(get(BROKEN_PATH, &[])).await.unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(&body_bytes(resp).await[..], b"Internal Server Error");
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let resp = app().oneshot(get("/nope", &[])).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(body_bytes(resp).await.is_empty());
}
