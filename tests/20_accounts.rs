mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::TestServer;
use market_api::auth::validate_jwt;
use market_api::config::AppConfig;

#[tokio::test]
async fn register_then_login() -> Result<()> {
    let server = TestServer::spawn().await?;

    let res = server
        .client
        .post(server.url("/register"))
        .json(&json!({"username": "ann", "email": "ann@example.com", "password": "pw1", "role": "user"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "User registered.");
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));

    let res = server
        .client
        .post(server.url("/login"))
        .json(&json!({"email": "ann@example.com", "password": "pw1"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    let token = body["token"].as_str().unwrap_or_default().to_string();

    // The login token opens protected routes
    let res = server.client.get(server.url("/users")).bearer_auth(&token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn password_is_stored_hashed() -> Result<()> {
    let server = TestServer::spawn().await?;
    server.register("ann", "ann@example.com", "pw1", "user").await?;

    let users = server.read_collection("users")?;
    assert_eq!(users.len(), 1);
    let stored = users[0]["password"].as_str().unwrap_or_default();
    assert_ne!(stored, "pw1");
    assert!(stored.starts_with("$2"));
    Ok(())
}

#[tokio::test]
async fn register_requires_every_field() -> Result<()> {
    let server = TestServer::spawn().await?;

    for body in [
        json!({"email": "a@example.com", "password": "pw", "role": "user"}),
        json!({"username": "a", "password": "pw", "role": "user"}),
        json!({"username": "a", "email": "a@example.com", "role": "user"}),
        json!({"username": "a", "email": "a@example.com", "password": "pw"}),
        json!({"username": "", "email": "a@example.com", "password": "pw", "role": "user"}),
    ] {
        let res = server.client.post(server.url("/register")).json(&body).send().await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let err: Value = res.json().await?;
        assert_eq!(err["error"], "All fields are required.");
    }

    assert!(server.read_collection("users")?.is_empty());
    Ok(())
}

#[tokio::test]
async fn duplicate_email_is_conflict() -> Result<()> {
    let server = TestServer::spawn().await?;
    server.register("ann", "ann@example.com", "pw1", "user").await?;

    let res = server
        .client
        .post(server.url("/register"))
        .json(&json!({"username": "other", "email": "ann@example.com", "password": "pw2", "role": "user"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let err: Value = res.json().await?;
    assert_eq!(err["error"], "Email already registered.");

    assert_eq!(server.read_collection("users")?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn login_failures() -> Result<()> {
    let server = TestServer::spawn().await?;
    server.register("ann", "ann@example.com", "pw1", "user").await?;

    let res = server
        .client
        .post(server.url("/login"))
        .json(&json!({"email": "nobody@example.com", "password": "pw1"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?["error"], "Invalid credentials");

    let res = server
        .client
        .post(server.url("/login"))
        .json(&json!({"email": "ann@example.com", "password": "wrong"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(res.json::<Value>().await?["error"], "Wrong password");
    Ok(())
}

#[tokio::test]
async fn users_list_hides_passwords() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.register("ann", "ann@example.com", "pw1", "user").await?;
    server.register("bob", "bob@example.com", "pw2", "admin").await?;

    let res = server.client.get(server.url("/users")).bearer_auth(&token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let users: Vec<Value> = res.json().await?;
    assert_eq!(users.len(), 2);
    for user in &users {
        assert!(user.get("password").is_none());
        assert!(user["id"].is_i64());
    }
    assert_eq!(users[1]["role"], "admin");
    Ok(())
}

#[tokio::test]
async fn protected_routes_check_the_token() -> Result<()> {
    let server = TestServer::spawn().await?;

    let res = server.client.get(server.url("/users")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(res.json::<Value>().await?["error"], "Missing token");

    let res = server.client.get(server.url("/users")).bearer_auth("not-a-jwt").send().await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn register_token_carries_stored_identity() -> Result<()> {
    let server = TestServer::spawn().await?;
    let security = AppConfig::development().security;

    let token = server.register("ann", "ann@example.com", "pw1", "admin").await?;
    let claims = validate_jwt(&token, &security)?;

    let stored = server.read_collection("users")?;
    assert_eq!(stored.len(), 1);
    assert_eq!(claims.id, server.user_id("ann@example.com")?);
    assert_eq!(stored[0]["id"], claims.id);
    assert_eq!(stored[0]["role"], claims.role.as_str());
    assert_eq!(stored[0]["email"], claims.email.as_str());
    assert_eq!(claims.role, "admin");

    // Login hands out a token for the same identity
    let res = server
        .client
        .post(server.url("/login"))
        .json(&json!({"email": "ann@example.com", "password": "pw1"}))
        .send()
        .await?;
    let body: Value = res.json().await?;
    let login_claims = validate_jwt(body["token"].as_str().unwrap_or_default(), &security)?;
    assert_eq!((login_claims.id, login_claims.role, login_claims.email), (claims.id, claims.role, claims.email));

    // A wrong password gets no token at all
    let res = server
        .client
        .post(server.url("/login"))
        .json(&json!({"email": "ann@example.com", "password": "pw2"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await?;
    assert!(body.get("token").is_none());
    Ok(())
}

#[tokio::test]
async fn register_keeps_unknown_fields_on_existing_users() -> Result<()> {
    let dir = tempfile::tempdir()?;
    std::fs::write(
        dir.path().join("users.json"),
        serde_json::to_string_pretty(&json!([{
            "id": 1,
            "username": "legacy",
            "email": "legacy@example.com",
            "password": "$2b$04$notarealhash",
            "role": "user",
            "phone": "555-0100"
        }]))?,
    )?;

    let server = TestServer::spawn_in(dir).await?;
    server.register("ann", "ann@example.com", "pw1", "user").await?;

    let users = server.read_collection("users")?;
    assert_eq!(users.len(), 2);
    assert_eq!(users[0]["phone"], "555-0100");
    Ok(())
}
