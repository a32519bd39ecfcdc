//! # Server Endpoint Tests
//!
//! Health checks, template listing, prompt assembly and request validation.
//! None of these reach the AI provider.

mod common;

use anyhow::Result;
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn test_root_and_health_check_endpoints() -> Result<()> {
    let app = TestApp::spawn().await?;

    let root_response = app.client.get(app.url("/")).send().await?;
    assert!(root_response.status().is_success());
    assert_eq!("metaprompt server is running.", root_response.text().await?);

    let health_response = app.client.get(app.url("/health")).send().await?;
    assert!(health_response.status().is_success());
    let body: serde_json::Value = health_response.json().await?;
    assert_eq!(body, json!({"status": "healthy"}));

    Ok(())
}

#[tokio::test]
async fn test_templates_are_listed_in_order() -> Result<()> {
    let app = TestApp::spawn().await?;

    let body: serde_json::Value = app
        .client
        .get(app.url("/templates"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(body, json!({"result": ["email", "invoice", "legal"]}));

    Ok(())
}

#[tokio::test]
async fn test_assemble_returns_prompt_without_calling_provider() -> Result<()> {
    let app = TestApp::spawn().await?;
    let mock = app.mock_completion("", "{}").await;

    let content = "Invoice INV-7\nTotal: {not a placeholder} 42.00";
    let (status, body) = app
        .post_json(
            "/assemble",
            &json!({"documentType": "Invoice", "content": content}),
        )
        .await?;

    assert_eq!(status, 200);
    let prompt = body["result"]["prompt"].as_str().unwrap();
    assert!(prompt.contains(content));
    assert!(!prompt.contains("{file_content}"));
    assert_eq!(mock.hits_async().await, 0);

    Ok(())
}

#[tokio::test]
async fn test_assemble_rejects_unknown_type_and_empty_content() -> Result<()> {
    let app = TestApp::spawn().await?;

    let (status, body) = app
        .post_json(
            "/assemble",
            &json!({"documentType": "contract_x", "content": "text"}),
        )
        .await?;
    assert_eq!(status, 400);
    assert_eq!(body["errorKind"], "UnknownTemplateKind");
    assert!(body["message"].as_str().unwrap().contains("contract_x"));

    let (status, body) = app
        .post_json("/assemble", &json!({"documentType": "email", "content": "  \n"}))
        .await?;
    assert_eq!(status, 400);
    assert_eq!(body["errorKind"], "EmptyContent");

    Ok(())
}

#[tokio::test]
async fn test_malformed_json_body_is_rejected() -> Result<()> {
    let app = TestApp::spawn().await?;

    let response = app
        .client
        .post(app.url("/extract"))
        .header("Content-Type", "application/json")
        .body(r#"{"documentType": "invoice", "content": "x""#)
        .send()
        .await?;
    assert_eq!(400, response.status().as_u16());
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["errorKind"], "InvalidRequest");

    // A missing field is rejected in the same envelope, not as axum's plain text.
    let (status, body) = app
        .post_json("/extract", &json!({"documentType": "invoice"}))
        .await?;
    assert_eq!(status, 400);
    assert_eq!(body["errorKind"], "InvalidRequest");
    assert!(body["message"].as_str().unwrap().contains("content"));

    let (status, body) = app
        .post_json("/generate-prompt", &json!({"temperature": 0.3}))
        .await?;
    assert_eq!(status, 400);
    assert_eq!(body["errorKind"], "InvalidRequest");

    Ok(())
}

#[tokio::test]
async fn test_cors_preflight_allows_any_origin() -> Result<()> {
    let app = TestApp::spawn().await?;

    let response = app
        .client
        .request(reqwest::Method::OPTIONS, app.url("/extract"))
        .header("Origin", "http://localhost:7860")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "content-type")
        .send()
        .await?;

    assert!(response.status().is_success());
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
    assert_eq!(response.headers()["access-control-allow-methods"], "*");

    Ok(())
}

#[tokio::test]
async fn test_configured_templates_extend_and_override_builtins() -> Result<()> {
    let dir = tempfile::tempdir()?;
    std::fs::write(
        dir.path().join("receipt.txt"),
        "Extract the merchant and total.\n\n{file_content}\n\n```json\n{\"merchant\": \"Shop\", \"total\": 1.0}\n```",
    )?;
    std::fs::write(
        dir.path().join("invoice.txt"),
        "CUSTOM INVOICE PROMPT\n{file_content}",
    )?;

    let extra = format!(
        r#"
templates:
  receipt:
    path: "{dir}/receipt.txt"
    required_keys: ["merchant", "total"]
  invoice:
    path: "{dir}/invoice.txt"
    required_keys: ["invoice"]
"#,
        dir = dir.path().display()
    );
    let app = TestApp::spawn_with_config(&extra).await?;

    let body: serde_json::Value = app
        .client
        .get(app.url("/templates"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(
        body,
        json!({"result": ["email", "invoice", "legal", "receipt"]})
    );

    let (status, body) = app
        .post_json(
            "/assemble",
            &json!({"documentType": "invoice", "content": "INV-9"}),
        )
        .await?;
    assert_eq!(status, 200);
    assert_eq!(body["result"]["prompt"], "CUSTOM INVOICE PROMPT\nINV-9");

    Ok(())
}

#[tokio::test]
async fn test_invalid_template_file_fails_startup() -> Result<()> {
    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join("memo.txt"), "No placeholder in here.")?;

    let extra = format!(
        "templates:\n  memo:\n    path: \"{}/memo.txt\"\n",
        dir.path().display()
    );
    let result = TestApp::spawn_with_config(&extra).await;
    assert!(result.is_err());

    Ok(())
}
