use std::time::Duration;

use anyhow::Result;
use http::{Method, StatusCode};
use pretty_assertions::assert_eq;
use streamone::{Client, Credential, Outcome, RequestSpec, SignedRequest, STATUS_UNRECOGNIZED};
use streamone_core::time::parse_timestamp;
use streamone_core::{Context, Error, ErrorKind, NoopEnv};
use streamone_http_send_reqwest::ReqwestHttpSend;

use super::{body_of, init_client, query_param, MockHttpSend, Reply, ENDPOINT, PSK};

const APPLICATION_VIEW: &str = r#"{
    "header": {
        "status": 0,
        "statusmessage": "OK",
        "apiversion": 3,
        "cacheable": true,
        "count": 1
    },
    "body": [
        {"id": "APPLICATION", "name": "Test application", "active": true}
    ]
}"#;

const NOT_FOUND: &str = r#"{
    "header": {"status": 1, "statusmessage": "Application not found"},
    "body": null
}"#;

fn application_view() -> RequestSpec {
    RequestSpec::builder("application", "view")
        .argument("application", "APPLICATION")
        .argument("limit", "3")
        .build()
        .expect("spec must be valid")
}

#[tokio::test]
async fn test_application_view_success() -> Result<()> {
    let mock = MockHttpSend::new([Reply::Respond(StatusCode::OK, APPLICATION_VIEW)]);
    let client = init_client(&mock);

    let cred = Credential::application("APPLICATION", PSK);
    let signed = application_view().sign(&cred, parse_timestamp("1452846289")?)?;
    let outcome = client.dispatch(&signed).await?;

    let Outcome::Success(env) = &outcome else {
        panic!("expected success, got {outcome:?}");
    };
    assert_eq!(env.body_items().len(), 1);
    assert_eq!(env.header.count(), Some(1));

    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    let req = &requests[0];
    assert_eq!(req.method, Method::POST);
    assert_eq!(
        req.uri.to_string(),
        format!(
            "{ENDPOINT}/api/application/view?api=3&format=json&authentication_type=application\
             &timestamp=1452846289&application=APPLICATION\
             &signature=ed17df5bad0fd2e4ac0bbc7fe726e400f02fdf04"
        )
    );
    assert_eq!(
        req.headers[http::header::CONTENT_TYPE],
        "application/x-www-form-urlencoded"
    );
    assert_eq!(body_of(req), "application=APPLICATION&limit=3");
    Ok(())
}

#[tokio::test]
async fn test_send_signs_with_current_time() -> Result<()> {
    let mock = MockHttpSend::new([Reply::Respond(StatusCode::OK, APPLICATION_VIEW)]);
    let client = init_client(&mock);

    let outcome = client.send(&application_view()).await?;
    assert!(outcome.is_success());

    let req = &mock.requests()[0];
    let timestamp = query_param(req, "timestamp").expect("timestamp must be sent");
    let signature = query_param(req, "signature").expect("signature must be sent");

    // Replaying the captured request must verify against the same credential.
    let replay = SignedRequest::from_parts(
        &RequestSpec::builder("application", "view")
            .parameter("api", "3")
            .parameter("format", "json")
            .parameter("authentication_type", "application")
            .parameter("application", "APPLICATION")
            .argument("application", "APPLICATION")
            .argument("limit", "3")
            .build()?,
        &timestamp,
        &signature,
    )?;
    assert_eq!(replay.query_string(), req.uri.query().unwrap_or_default());
    assert!(replay.verify(&Credential::application("APPLICATION", PSK), None));
    Ok(())
}

#[tokio::test]
async fn test_application_error() -> Result<()> {
    let mock = MockHttpSend::new([Reply::Respond(StatusCode::OK, NOT_FOUND)]);
    let client = init_client(&mock);

    let outcome = client.send(&application_view()).await?;
    let Outcome::ApplicationError(env) = &outcome else {
        panic!("expected application error, got {outcome:?}");
    };
    assert_eq!(env.status(), 1);
    assert_eq!(env.status_message(), "Application not found");
    assert!(env.body_items().is_empty());

    let err = outcome.into_result().expect_err("must fail");
    assert_eq!(err.kind(), ErrorKind::Application);
    Ok(())
}

#[tokio::test]
async fn test_envelope_on_http_error_status() -> Result<()> {
    let mock = MockHttpSend::new([Reply::Respond(StatusCode::FORBIDDEN, NOT_FOUND)]);
    let client = init_client(&mock);

    let outcome = client.send(&application_view()).await?;
    let Outcome::ApplicationError(env) = &outcome else {
        panic!("expected application error, got {outcome:?}");
    };
    assert_eq!(env.status(), 1);
    assert_eq!(env.header.http_status(), Some(StatusCode::FORBIDDEN));
    Ok(())
}

#[tokio::test]
async fn test_success_envelope_on_http_error_status() -> Result<()> {
    let mock = MockHttpSend::new([Reply::Respond(
        StatusCode::INTERNAL_SERVER_ERROR,
        APPLICATION_VIEW,
    )]);
    let client = init_client(&mock);

    let outcome = client.send(&application_view()).await?;
    let Outcome::ApplicationError(env) = &outcome else {
        panic!("expected application error, got {outcome:?}");
    };
    assert_eq!(env.status(), 0);
    assert_eq!(env.status_message(), "OK");
    assert_eq!(env.header.http_status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    assert_eq!(env.body_items()[0]["id"], "APPLICATION");
    Ok(())
}

#[tokio::test]
async fn test_unrecognized_response() -> Result<()> {
    let mock = MockHttpSend::new([Reply::Respond(
        StatusCode::BAD_GATEWAY,
        "<html>502 Bad Gateway</html>",
    )]);
    let client = init_client(&mock);

    let outcome = client.send(&application_view()).await?;
    let Outcome::ApplicationError(env) = &outcome else {
        panic!("expected application error, got {outcome:?}");
    };
    assert_eq!(env.status(), STATUS_UNRECOGNIZED);
    assert!(env.status_message().contains("502"));
    Ok(())
}

#[tokio::test]
async fn test_transport_failure_is_lost_connection() -> Result<()> {
    let mock = MockHttpSend::new([Reply::Fail(Error::transport("connection reset"))]);
    let client = init_client(&mock);

    let outcome = client.send(&application_view()).await?;
    let Outcome::LostConnection(err) = &outcome else {
        panic!("expected lost connection, got {outcome:?}");
    };
    assert_eq!(err.kind(), ErrorKind::Transport);
    Ok(())
}

#[tokio::test]
async fn test_connection_refused_is_lost_connection() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();

    let ctx = Context::new()
        .with_env(NoopEnv)
        .with_http_send(ReqwestHttpSend::default());
    let client = Client::with_loader(
        ctx,
        "127.0.0.1:1",
        streamone::StaticCredentialProvider::application("APPLICATION", PSK),
    )?;

    let outcome = client.send(&application_view()).await?;
    assert!(matches!(outcome, Outcome::LostConnection(_)));
    Ok(())
}

#[tokio::test]
async fn test_deadline_is_lost_connection() -> Result<()> {
    let mock = MockHttpSend::new([Reply::Delay(
        Duration::from_secs(5),
        StatusCode::OK,
        APPLICATION_VIEW,
    )]);
    let client = init_client(&mock).with_timeout(Duration::from_millis(50));

    let outcome = client.send(&application_view()).await?;
    let Outcome::LostConnection(err) = &outcome else {
        panic!("expected lost connection, got {outcome:?}");
    };
    assert!(err.is_temporary());
    Ok(())
}

#[tokio::test]
async fn test_missing_signature_is_rejected_before_sending() -> Result<()> {
    let spec = RequestSpec::builder("application", "view")
        .parameter("api", "3")
        .parameter("format", "json")
        .parameter("authentication_type", "application")
        .parameter("application", "APPLICATION")
        .build()?;

    let err = SignedRequest::from_parts(&spec, "1452846289", "").expect_err("must fail");
    assert_eq!(err.kind(), ErrorKind::SpecInvalid);

    let err = SignedRequest::from_parts(&spec, "1452846289", "NOT-HEX").expect_err("must fail");
    assert_eq!(err.kind(), ErrorKind::SpecInvalid);
    Ok(())
}

#[tokio::test]
async fn test_concurrent_sends_resolve_independently() -> Result<()> {
    let mock = MockHttpSend::new([
        Reply::Respond(StatusCode::OK, APPLICATION_VIEW),
        Reply::Respond(StatusCode::OK, NOT_FOUND),
    ]);
    let client = init_client(&mock);
    let spec = application_view();

    let (first, second) = tokio::join!(client.send(&spec), client.send(&spec));
    let outcomes = [first?, second?];
    assert_eq!(mock.requests().len(), 2);

    // Replies are handed out in arrival order, so either send may get either one.
    let mut statuses = outcomes
        .iter()
        .map(|outcome| match outcome {
            Outcome::Success(env) => ("success", env.status()),
            Outcome::ApplicationError(env) => ("application error", env.status()),
            Outcome::LostConnection(err) => panic!("expected a reply, got {err:?}"),
        })
        .collect::<Vec<_>>();
    statuses.sort();
    assert_eq!(statuses, vec![("application error", 1), ("success", 0)]);
    Ok(())
}
