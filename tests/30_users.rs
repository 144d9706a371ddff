mod common;

use anyhow::Result;
use common::TestServer;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn add_user() -> Result<()> {
    let server = TestServer::start().await?;

    let res = server
        .post("/admin/users")
        .json(&json!({
            "username": "justatest",
            "email": "test@test.com",
            "password": "greaterthaneight"
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await?;
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "User justatest was added!");
    assert_eq!(body["user"]["id"], 1);
    assert!(body.get("auth_token").is_none());
    Ok(())
}

#[tokio::test]
async fn add_duplicate_user_fails() -> Result<()> {
    let server = TestServer::start().await?;
    let payload = json!({"username": "justatest", "email": "test@test.com", "password": "pw"});

    let first = server.post("/admin/users").json(&payload).send().await?;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = server.post("/admin/users").json(&payload).send().await?;
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    let body: Value = second.json().await?;
    assert_eq!(body["message"], "Sorry. That user already exists.");
    Ok(())
}

#[tokio::test]
async fn list_and_get_users() -> Result<()> {
    let server = TestServer::start().await?;
    server.register("michael", "michael@mherman.org", false).await?;
    server.register("fletcher", "fletcher@notreal.com", false).await?;

    let res = server.get("/admin/users").send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    let users = body["data"]["users"].as_array().expect("users array");
    assert_eq!(users.len(), 2);
    assert_eq!(users[0]["username"], "michael");
    assert_eq!(users[1]["username"], "fletcher");

    let res = server.get("/admin/users/2").send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["email"], "fletcher@notreal.com");
    Ok(())
}

#[tokio::test]
async fn missing_or_malformed_user_id_is_not_found() -> Result<()> {
    let server = TestServer::start().await?;

    for path in ["/admin/users/999", "/admin/users/blah"] {
        let res = server.get(path).send().await?;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body: Value = res.json().await?;
        assert_eq!(body["status"], "fail");
        assert_eq!(body["message"], "User does not exist");
    }
    Ok(())
}

#[tokio::test]
async fn overlong_identity_is_rejected() -> Result<()> {
    let server = TestServer::start().await?;
    let long = "x".repeat(129);

    for (path, payload, field) in [
        (
            "/admin/users",
            json!({"username": long, "email": "a@test.com", "password": "pw"}),
            "username",
        ),
        (
            "/admin/register",
            json!({"username": "someone", "email": format!("{}@test.com", long), "password": "pw"}),
            "email",
        ),
    ] {
        let res = server.post(path).json(&payload).send().await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = res.json().await?;
        assert_eq!(body["status"], "fail");
        assert_eq!(
            body["message"],
            format!("'{}' must be at most 128 characters.", field)
        );
    }

    let res = server.get("/admin/users").send().await?;
    let body: Value = res.json().await?;
    assert!(body["data"]["users"].as_array().expect("users array").is_empty());
    Ok(())
}
