use anyhow::Result;
use http::StatusCode;
use pretty_assertions::assert_eq;
use streamone::{Credential, Outcome, RequestSpec};
use streamone_core::time::{now, parse_timestamp};
use streamone_core::ErrorKind;

use super::{body_of, init_client, query_param, MockHttpSend, Reply, PSK};

const INITIALIZE: &str = r#"{
    "header": {"status": 0, "statusmessage": "OK"},
    "body": {
        "challenge": "Kc9bnW2GtNNEBvDr4tVO4ewtlvn52Ar8",
        "salt": "$2y$12$Hx4CqyE7p9WRKNfG5mD3Ze",
        "needsv2hash": false
    }
}"#;

const CREATE: &str = r#"{
    "header": {"status": 0, "statusmessage": "OK"},
    "body": {
        "id": "sC5tGogRgBow",
        "key": "gR92jURda7mEqiDzhcz2bC1FtIzS8wxe",
        "timeout": 3600,
        "user": "user"
    }
}"#;

const WRONG_PASSWORD: &str = r#"{
    "header": {"status": 12, "statusmessage": "Invalid challenge response"},
    "body": null
}"#;

const VIEWME: &str = r#"{
    "header": {"status": 0, "statusmessage": "OK"},
    "body": {"id": "user", "username": "user"}
}"#;

#[tokio::test]
async fn test_initialize_session() -> Result<()> {
    let mock = MockHttpSend::new([Reply::Respond(StatusCode::OK, INITIALIZE)]);
    let client = init_client(&mock);

    let challenge = client.initialize_session("user", "127.0.0.2").await?;
    assert_eq!(challenge.challenge, "Kc9bnW2GtNNEBvDr4tVO4ewtlvn52Ar8");
    assert_eq!(challenge.salt, "$2y$12$Hx4CqyE7p9WRKNfG5mD3Ze");
    assert!(!challenge.needsv2hash);

    let req = &mock.requests()[0];
    assert_eq!(req.uri.path(), "/api/session/initialize");
    assert_eq!(body_of(req), "user=user&userip=127.0.0.2");
    Ok(())
}

#[test]
fn test_initialize_session_known_signature() -> Result<()> {
    let cred = Credential::application("APPLICATION", PSK);
    let signed = RequestSpec::builder("session", "initialize")
        .argument("user", "user")
        .argument("userip", "127.0.0.2")
        .build()?
        .sign(&cred, parse_timestamp("1452846289")?)?;

    assert_eq!(signed.signature(), "aa65f782eac9766a599a65979ac76854ce780cc5");
    Ok(())
}

#[tokio::test]
async fn test_session_flow() -> Result<()> {
    let mock = MockHttpSend::new([
        Reply::Respond(StatusCode::OK, INITIALIZE),
        Reply::Respond(StatusCode::OK, CREATE),
        Reply::Respond(StatusCode::OK, VIEWME),
    ]);
    let client = init_client(&mock);

    let challenge = client.initialize_session("user", "127.0.0.2").await?;
    let before = now();
    let token = client
        .create_session(&challenge.challenge, "hashed-response")
        .await?;
    assert_eq!(token.id, "sC5tGogRgBow");
    assert_eq!(token.user.as_deref(), Some("user"));
    assert!(token.expires_at >= before + chrono::TimeDelta::seconds(3600));
    assert!(!token.is_expired(now()));

    let client = client.with_session(token.clone());
    let outcome = client
        .send(&RequestSpec::builder("user", "viewme").build()?)
        .await?;
    assert!(matches!(outcome, Outcome::Success(_)));

    let requests = mock.requests();
    assert_eq!(requests.len(), 3);
    // Creating the session itself is signed without one.
    assert_eq!(query_param(&requests[1], "session"), None);
    assert_eq!(
        body_of(&requests[1]),
        format!("challenge={}&response=hashed-response", challenge.challenge)
    );
    assert_eq!(
        query_param(&requests[2], "session").as_deref(),
        Some("sC5tGogRgBow")
    );
    Ok(())
}

#[tokio::test]
async fn test_create_session_rejected() -> Result<()> {
    let mock = MockHttpSend::new([Reply::Respond(StatusCode::OK, WRONG_PASSWORD)]);
    let client = init_client(&mock);

    let err = client
        .create_session("challenge", "wrong")
        .await
        .expect_err("must fail");
    assert_eq!(err.kind(), ErrorKind::Application);
    assert!(err.message().contains("Invalid challenge response"));
    Ok(())
}

#[tokio::test]
async fn test_expired_session_is_not_sent() -> Result<()> {
    let mock = MockHttpSend::default();
    let client = init_client(&mock).with_session(streamone::SessionToken::new(
        "sC5tGogRgBow",
        "gR92jURda7mEqiDzhcz2bC1FtIzS8wxe",
        now() - chrono::TimeDelta::seconds(1),
    ));

    let err = client
        .send(&RequestSpec::builder("user", "viewme").build()?)
        .await
        .expect_err("must fail");
    assert_eq!(err.kind(), ErrorKind::CredentialExpired);
    assert!(mock.requests().is_empty());
    Ok(())
}
