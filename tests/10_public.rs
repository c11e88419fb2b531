mod common;

use anyhow::Result;
use axum::http::StatusCode;

use common::TestApp;

#[tokio::test]
async fn root_describes_the_service() -> Result<()> {
    let app = TestApp::empty();
    let (status, body) = app.get("/", None).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["name"], "E-Unify Menu Registry");
    Ok(())
}

#[tokio::test]
async fn health_reports_store_state() -> Result<()> {
    let app = TestApp::empty();

    let (status, body) = app.get("/health", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");

    app.store.set_offline(true);
    let (status, body) = app.get("/health", None).await?;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);
    Ok(())
}
