use super::{create_local_app, json, send};
use axum::http::{Method, StatusCode};

#[tokio::test]
async fn test_contact_accepts_complete_submission() {
    let app = create_local_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/contact",
        Some(json!({
            "name": "Ada Lovelace",
            "email": "ada@example.com",
            "company": "Analytical Engines Ltd",
            "service": "strategy",
            "message": "We'd like a workshop next quarter."
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "success": true,
            "message": "Thank you for your message! We'll get back to you soon."
        })
    );
}

#[tokio::test]
async fn test_contact_requires_email_and_message() {
    let app = create_local_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/contact",
        Some(json!({"name": "Ada", "message": "Hello"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid or missing fields: email");

    let (status, body) = send(
        &app,
        Method::POST,
        "/contact",
        Some(json!({"name": "Ada", "email": "ada@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid or missing fields: message");

    let (status, body) = send(&app, Method::POST, "/contact", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid or missing fields: email, message, name");
}

#[tokio::test]
async fn test_contact_rejects_bad_email() {
    let app = create_local_app();

    let (status, _) = send(
        &app,
        Method::POST,
        "/contact",
        Some(json!({"name": "Ada", "email": "not-an-email", "message": "Hi"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_contact_has_no_side_effects() {
    let app = create_local_app();

    send(&app, Method::POST, "/contact", Some(json!({"name": "Ada"}))).await;

    let (_, list) = send(&app, Method::GET, "/conversations", None).await;
    assert_eq!(list["data"], json!([]));
}

#[tokio::test]
async fn test_newsletter_subscription() {
    let app = create_local_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/newsletter",
        Some(json!({"email": "reader@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Successfully subscribed to the newsletter");

    let (status, body) = send(&app, Method::POST, "/newsletter", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid or missing fields: email");
}
