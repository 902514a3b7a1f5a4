//! HTTP engine tests against a mock query service.

#![cfg(feature = "http")]

use std::sync::Arc;

use mockito::{Matcher, Mock, Server};
use serde_json::json;
use tablelens_core::{
    CellValue, QueryEngine, Result,
    engine::http::HttpEngine,
    quality::{CheckStatus, QualityAssessor},
};

fn query_body(query: &str) -> Matcher {
    Matcher::Json(json!({ "query": query }))
}

#[tokio::test]
async fn test_http_execute_success() -> Result<()> {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/query")
        .match_header("content-type", "application/json")
        .match_body(query_body("SELECT 1 AS x"))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"data":[{"x":1,"label":"one"}]}"#)
        .expect(1)
        .create_async()
        .await;

    let engine = HttpEngine::new(&server.url())?;
    let rows = engine.execute("SELECT 1 AS x").await?;

    assert_eq!(rows.len(), 1);
    assert_eq!(rows.column_names(), vec!["x", "label"]);
    assert_eq!(rows.first().unwrap().get("x"), Some(&CellValue::Number(1.0)));
    mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn test_http_missing_data_is_empty() -> Result<()> {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("POST", "/api/query")
        .with_status(200)
        .with_body(r#"{"success":true}"#)
        .create_async()
        .await;

    let engine = HttpEngine::new(&server.url())?;
    assert!(engine.execute("CREATE TABLE t (a INT)").await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_http_error_message_is_verbatim() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("POST", "/api/query")
        .with_status(500)
        .with_body(r#"{"error":"Catalog Error: Table with name ghost does not exist!"}"#)
        .create_async()
        .await;

    let engine = HttpEngine::new(&server.url()).unwrap();
    let err = engine.execute("SELECT * FROM ghost").await.unwrap_err();

    assert!(err.is_query_error());
    assert_eq!(
        err.to_string(),
        "Catalog Error: Table with name ghost does not exist!"
    );
}

#[tokio::test]
async fn test_http_error_without_body_uses_status() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("POST", "/api/query")
        .with_status(503)
        .with_body("upstream unavailable")
        .create_async()
        .await;

    let engine = HttpEngine::new(&server.url()).unwrap();
    let err = engine.execute("SELECT 1").await.unwrap_err();
    assert_eq!(err.to_string(), "503 Service Unavailable");
}

/// Registers the three assessment queries for `table`. Mocks live as long as
/// the returned handles.
async fn mock_table(
    server: &mut Server,
    table: &str,
    summary: serde_json::Value,
    total: &str,
    dups: u64,
) -> Vec<Mock> {
    let summary_mock = server
        .mock("POST", "/api/query")
        .match_body(query_body(&format!("SUMMARIZE \"{}\"", table)))
        .with_status(200)
        .with_body(json!({ "data": summary }).to_string())
        .create_async()
        .await;
    let count_mock = server
        .mock("POST", "/api/query")
        .match_body(query_body(&format!(
            "SELECT COUNT(*) AS total_rows FROM \"{}\"",
            table
        )))
        .with_status(200)
        .with_body(json!({ "data": [{ "total_rows": total }] }).to_string())
        .create_async()
        .await;
    let dup_mock = server
        .mock("POST", "/api/query")
        .match_body(query_body(&format!(
            "SELECT COUNT(*) AS dup_count FROM (SELECT *, COUNT(*) AS cnt FROM \"{}\" GROUP BY ALL HAVING cnt > 1)",
            table
        )))
        .with_status(200)
        .with_body(json!({ "data": [{ "dup_count": dups }] }).to_string())
        .create_async()
        .await;
    vec![summary_mock, count_mock, dup_mock]
}

#[tokio::test]
async fn test_http_assessment_all_identifiers_scores_100() -> Result<()> {
    let mut server = Server::new_async().await;
    let _mocks = mock_table(
        &mut server,
        "orders",
        json!([
            {"column_name": "id", "column_type": "BIGINT", "min": "1", "max": "100", "approx_unique": 100, "null_percentage": "0.00%"},
            {"column_name": "ref", "column_type": "VARCHAR", "min": "a", "max": "z", "approx_unique": 98, "null_percentage": 0},
            {"column_name": "ts", "column_type": "TIMESTAMP", "min": null, "max": null, "approx_unique": "97", "null_percentage": "0"}
        ]),
        "100",
        4,
    )
    .await;

    let engine = HttpEngine::new(&server.url())?;
    let report = QualityAssessor::new(Arc::new(engine)).assess("orders").await?;

    assert_eq!(report.total_rows, 100);
    assert_eq!(report.column_count, 3);
    assert_eq!(report.duplicate_row_count, 4);
    assert_eq!(report.total_checks(), 6);
    assert_eq!(report.score, 100);
    Ok(())
}

#[tokio::test]
async fn test_http_assessment_failing_column_scores_zero() -> Result<()> {
    let mut server = Server::new_async().await;
    let _mocks = mock_table(
        &mut server,
        "events",
        json!([
            {"column_name": "kind", "column_type": "VARCHAR", "approx_unique": 27, "null_percentage": 10.0}
        ]),
        "100",
        0,
    )
    .await;

    let engine = HttpEngine::new(&server.url())?;
    let report = QualityAssessor::new(Arc::new(engine)).assess("events").await?;

    let checks = &report.columns[0].checks;
    assert_eq!(checks[0].status, CheckStatus::Fail);
    assert_eq!(checks[0].detail, "10% null values");
    assert_eq!(checks[1].status, CheckStatus::Info);
    assert_eq!(report.passed_checks(), 0);
    assert_eq!(report.score, 0);
    Ok(())
}

#[tokio::test]
async fn test_http_assessment_fails_when_any_query_fails() {
    let mut server = Server::new_async().await;
    let _summary = server
        .mock("POST", "/api/query")
        .match_body(Matcher::Regex("SUMMARIZE".to_string()))
        .with_status(200)
        .with_body(r#"{"data":[]}"#)
        .create_async()
        .await;
    let _count = server
        .mock("POST", "/api/query")
        .match_body(Matcher::Regex("total_rows".to_string()))
        .with_status(200)
        .with_body(r#"{"data":[{"total_rows":3}]}"#)
        .create_async()
        .await;
    let _dups = server
        .mock("POST", "/api/query")
        .match_body(Matcher::Regex("dup_count".to_string()))
        .with_status(400)
        .with_body(r#"{"error":"Binder Error: GROUP BY ALL not supported"}"#)
        .create_async()
        .await;

    let engine = HttpEngine::new(&server.url()).unwrap();
    let err = QualityAssessor::new(Arc::new(engine))
        .assess("t")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Binder Error: GROUP BY ALL not supported");
}
