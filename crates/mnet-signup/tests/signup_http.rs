use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use mnet_signup::batch::parse_rows;
use mnet_signup::config::SignupConfig;
use mnet_signup::signup::{
    run_single, CallLabel, FailureKind, HttpSignupService, SignupError, SignupFields,
    AUTH_TOKEN_PATH, SAVE_TMP_PATH,
};
use mnet_signup::transport::TransportConfig;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn config_for(server: &MockServer, retries: u32) -> SignupConfig {
    SignupConfig {
        base_url: server.uri(),
        transport: TransportConfig {
            timeout: Duration::from_secs(5),
            retries,
            backoff: Duration::from_millis(5),
            ..TransportConfig::default()
        },
    }
}

fn fields() -> SignupFields {
    SignupFields {
        device_name: Some("itest-device".to_string()),
        ..SignupFields::new("fan@example.com", "s3cret")
    }
}

async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(AUTH_TOKEN_PATH))
        .and(header("content-type", "application/json;charset=UTF-8"))
        .and(header("user-agent", "MnetSignupBot/1.0"))
        .and(body_partial_json(json!({
            "email": "fan@example.com",
            "purpose": "signup",
            "deviceName": "itest-device",
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": true, "data": { "token": "tok-xyz" } })),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn single_signup_runs_both_calls_in_order() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("POST"))
        .and(path(SAVE_TMP_PATH))
        .and(body_partial_json(json!({
            "email": "fan@example.com",
            "password": "s3cret",
            "birthDate": "1998",
            "authToken": "tok-xyz",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    run_single(fields(), &config_for(&server, 0))
        .await
        .expect("signup succeeds");

    let requests = server.received_requests().await.unwrap();
    let paths: Vec<_> = requests.iter().map(|req| req.url.path().to_string()).collect();
    assert_eq!(paths, vec![AUTH_TOKEN_PATH, SAVE_TMP_PATH]);
}

#[tokio::test]
async fn save_is_never_attempted_after_token_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(AUTH_TOKEN_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad email"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(SAVE_TMP_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = run_single(fields(), &config_for(&server, 3))
        .await
        .expect_err("token rejected");

    assert_eq!(err.kind(), FailureKind::Http);
    assert_eq!(err.label(), Some(CallLabel::AuthToken));
    assert_eq!(err.to_string(), "authToken HTTP 400: bad email");
}

#[tokio::test]
async fn transient_503s_are_retried_transparently() {
    let server = MockServer::start().await;
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = attempts.clone();
    Mock::given(method("POST"))
        .and(path(AUTH_TOKEN_PATH))
        .respond_with(move |_req: &Request| -> ResponseTemplate {
            if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                ResponseTemplate::new(503)
            } else {
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "success": true, "data": { "token": "tok" } }))
            }
        })
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(SAVE_TMP_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .mount(&server)
        .await;

    run_single(fields(), &config_for(&server, 3))
        .await
        .expect("retries absorb the outage");

    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn exhausted_retries_report_the_last_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(AUTH_TOKEN_PATH))
        .respond_with(ResponseTemplate::new(502).set_body_string("upstream down"))
        .expect(3)
        .mount(&server)
        .await;

    let err = run_single(fields(), &config_for(&server, 2))
        .await
        .expect_err("still failing");

    assert!(matches!(err, SignupError::Http { status: 502, .. }));
}

#[tokio::test]
async fn batch_over_http_counts_each_row() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(AUTH_TOKEN_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": true, "data": { "token": "tok" } })),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(SAVE_TMP_PATH))
        .and(body_partial_json(json!({ "email": "bad@example.com" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": false })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(SAVE_TMP_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .mount(&server)
        .await;

    let csv = "email,password,gender,birth_year,device_name,locale,marketing_terms_version\n\
good@example.com,pw,f,2000,dev-a,ko,2\n\
,pw,,,,,\n\
bad@example.com,pw,,,,,\n";
    let rows = parse_rows(csv.as_bytes()).expect("csv parses");
    let service = HttpSignupService::from_config(&config_for(&server, 0)).expect("client builds");

    let summary = service.run_batch(rows, service.defaults()).await;

    assert_eq!(summary.processed, 2);
    assert_eq!(summary.success, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.failures[0].email, "bad@example.com");
    assert!(summary.failures[0].error.starts_with("save-tmp failed"));
}
