mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn ping_answers_on_both_services() -> Result<()> {
    let server = common::TestServer::start().await?;

    for path in ["/ping", "/admin/ping"] {
        let res = server.get(path).send().await?;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = res.json().await?;
        assert_eq!(body["status"], "success");
        assert_eq!(body["message"], "pong!");
    }
    Ok(())
}

#[tokio::test]
async fn cors_is_permissive() -> Result<()> {
    let server = common::TestServer::start().await?;

    let res = server
        .get("/ping")
        .header("Origin", "http://localhost:3000")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
    Ok(())
}
