//! End-to-end scenarios: scripted UI events driven through the runtime against
//! a mock API.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use calmmap_core::api::{RequestClient, UploadFile};
use calmmap_core::config::DialogConfig;
use calmmap_core::flows::{AddressSelection, AuthFields, Preference};
use calmmap_core::session::{SessionContext, TokenStore};
use calmmap_ui::events::{OrgFieldEdit, OrgFileSlot};
use calmmap_ui::{Runtime, SaveStatus, SubmitControl, UiEvent};
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{any, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

fn fast_timing() -> DialogConfig {
    DialogConfig {
        close_delay_ms: 10,
        submit_reset_delay_ms: 20,
    }
}

fn token_with(payload: &Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("{header}.{body}.sig")
}

fn user_token() -> String {
    token_with(&json!({ "user_id": 7, "name": "Ada", "email": "a@b.com", "role": "user" }))
}

fn runtime(base_url: &str, initial: Option<&str>) -> (Runtime, SessionContext) {
    let store = TokenStore::in_memory();
    if let Some(token) = initial {
        store.set(token);
    }
    let tokens = store.into_context();
    let client = RequestClient::new(base_url, Arc::clone(&tokens)).expect("build client");
    let mut runtime = Runtime::new(client, fast_timing());
    runtime.start();
    (runtime, tokens)
}

fn open_org_dialog(runtime: &mut Runtime) {
    runtime.dispatch(UiEvent::AddressSelected(AddressSelection::new(
        "Main st. 1",
        Some((37.618_423, 55.751_244)),
    )));
    runtime.dispatch(UiEvent::OrgButtonClicked);
    runtime.dispatch(UiEvent::OrgFieldEdited(OrgFieldEdit::OrganizationType(
        "cafe".into(),
    )));
    assert!(runtime.state.org_dialog.open);
}

#[tokio::test]
async fn test_login_closes_dialog_and_fetches_preferences() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    let token = user_token();

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": token })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/user-params/7"))
        .and(header("authorization", format!("Bearer {token}").as_str()))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "smell": true, "calmness": true })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (mut runtime, tokens) = runtime(&server.uri(), None);
    assert_eq!(runtime.state.auth_button_label(), "Sign in");

    runtime.dispatch(UiEvent::AuthButtonClicked);
    runtime.dispatch(UiEvent::AuthFieldsEdited(AuthFields {
        email: "a@b.com".into(),
        password: "x".into(),
        ..AuthFields::default()
    }));
    runtime.dispatch(UiEvent::AuthSubmitted);
    runtime.run_until_idle().await;

    let state = &runtime.state;
    assert_eq!(tokens.get().as_deref(), Some(token.as_str()));
    assert!(!state.auth_dialog.open);
    assert!(state.auth_dialog.error.is_none());
    assert_eq!(state.auth_button_label(), "Profile");
    assert_eq!(state.profile().unwrap().name, "Ada");
    assert!(state.preferences.get(Preference::Smell));
    assert!(state.preferences.get(Preference::Calmness));
    assert!(!state.preferences.get(Preference::Lighting));
}

#[tokio::test]
async fn test_failed_login_keeps_dialog_open_with_error() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "error": "Invalid credentials" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (mut runtime, tokens) = runtime(&server.uri(), None);
    let fields = AuthFields {
        email: "a@b.com".into(),
        password: "wrong".into(),
        ..AuthFields::default()
    };
    runtime.dispatch(UiEvent::AuthButtonClicked);
    runtime.dispatch(UiEvent::AuthFieldsEdited(fields.clone()));
    runtime.dispatch(UiEvent::AuthSubmitted);
    runtime.run_until_idle().await;

    assert!(tokens.get().is_none());
    assert!(runtime.state.auth_dialog.open);
    assert_eq!(
        runtime.state.auth_dialog.error.as_deref(),
        Some("Invalid credentials")
    );
    assert_eq!(runtime.state.auth_dialog.fields, fields);
}

#[tokio::test]
async fn test_logout_reverts_ui_without_requests() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user-params/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "lighting": true })))
        .expect(1)
        .mount(&server)
        .await;

    let (mut runtime, tokens) = runtime(&server.uri(), Some(&user_token()));
    runtime.run_until_idle().await;
    assert!(runtime.state.preferences.get(Preference::Lighting));

    let before = server.received_requests().await.unwrap().len();
    runtime.dispatch(UiEvent::AuthButtonClicked);
    runtime.dispatch(UiEvent::LogoutClicked);
    runtime.run_until_idle().await;

    assert!(tokens.get().is_none());
    assert!(!runtime.state.is_signed_in());
    assert!(!runtime.state.auth_dialog.open);
    assert!(!runtime.state.preferences.get(Preference::Lighting));
    assert_eq!(runtime.state.auth_button_label(), "Sign in");
    assert_eq!(server.received_requests().await.unwrap().len(), before);
}

#[tokio::test]
async fn test_preferences_save_creates_record_on_404() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user-params/7"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/user-params/7"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/user-params"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 1 })))
        .expect(1)
        .mount(&server)
        .await;

    let (mut runtime, _tokens) = runtime(&server.uri(), Some(&user_token()));
    runtime.run_until_idle().await;

    runtime.dispatch(UiEvent::PreferenceToggled {
        preference: Preference::Temperature,
        value: true,
    });
    runtime.dispatch(UiEvent::PreferencesSaveClicked);
    assert_eq!(runtime.state.preferences_status, SaveStatus::Saving);
    runtime.run_until_idle().await;

    assert_eq!(runtime.state.preferences_status, SaveStatus::Saved);
}

#[tokio::test]
async fn test_organization_created_with_both_files() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/organization"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 42 })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/organization/42/map/upload"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/organization/42/picture/upload"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let (mut runtime, _tokens) = runtime(&server.uri(), Some(&user_token()));
    open_org_dialog(&mut runtime);
    runtime.dispatch(UiEvent::OrgFieldEdited(OrgFieldEdit::File(
        OrgFileSlot::Map,
        Some(UploadFile::new("plan.png", b"png".to_vec())),
    )));
    runtime.dispatch(UiEvent::OrgFieldEdited(OrgFieldEdit::File(
        OrgFileSlot::Picture,
        Some(UploadFile::new("front.webp", b"webp".to_vec())),
    )));
    runtime.dispatch(UiEvent::OrgSubmitted);
    assert_eq!(runtime.state.org_dialog.submit, SubmitControl::Busy);
    runtime.run_until_idle().await;

    let dialog = &runtime.state.org_dialog;
    assert!(!dialog.open, "closed after the success delay");
    assert!(dialog.error.is_none());
    assert_eq!(dialog.submit, SubmitControl::Ready);

    let created = server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .find(|r| r.url.path() == "/organization")
        .unwrap();
    let body: Value = serde_json::from_slice(&created.body).unwrap();
    assert_eq!(body["latitude"], json!(55.751_244));
    assert_eq!(body["longitude"], json!(37.618_423));
}

#[tokio::test]
async fn test_map_upload_network_error_skips_picture() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    // Answers the create request, then drops every later connection unanswered.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let connections = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&connections);
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            if seen.fetch_add(1, Ordering::SeqCst) > 0 {
                drop(socket);
                continue;
            }
            read_request(&mut socket).await;
            let body = r#"{"id":42}"#;
            let response = format!(
                "HTTP/1.1 201 Created\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    let store = TokenStore::in_memory();
    store.set("opaque-token");
    let client = RequestClient::new(base_url, store.into_context()).unwrap();
    let mut runtime = Runtime::new(client, fast_timing());
    runtime.start();

    open_org_dialog(&mut runtime);
    runtime.dispatch(UiEvent::OrgFieldEdited(OrgFieldEdit::File(
        OrgFileSlot::Map,
        Some(UploadFile::new("plan.png", vec![0; 64])),
    )));
    runtime.dispatch(UiEvent::OrgFieldEdited(OrgFieldEdit::File(
        OrgFileSlot::Picture,
        Some(UploadFile::new("front.jpg", vec![0; 64])),
    )));
    runtime.dispatch(UiEvent::OrgSubmitted);
    runtime.run_until_idle().await;

    let dialog = &runtime.state.org_dialog;
    assert!(dialog.open);
    assert_eq!(dialog.error.as_deref(), Some("Upload failed: network error"));
    assert_eq!(dialog.notice.as_deref(), Some("Organization 42 created"));
    assert_eq!(dialog.submit, SubmitControl::Ready, "re-enabled after the delay");
    assert_eq!(connections.load(Ordering::SeqCst), 2, "picture upload never attempted");
}

#[tokio::test]
async fn test_organization_without_address_issues_no_request() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let (mut runtime, _tokens) = runtime(&server.uri(), Some(&user_token()));
    runtime.dispatch(UiEvent::OrgButtonClicked);
    assert!(!runtime.state.org_dialog.open);
    assert!(runtime.state.org_dialog.error.is_some());

    open_org_dialog(&mut runtime);
    runtime.dispatch(UiEvent::OrgFieldEdited(OrgFieldEdit::Address("  ".into())));
    runtime.dispatch(UiEvent::OrgSubmitted);
    runtime.run_until_idle().await;

    assert_eq!(
        runtime.state.org_dialog.error.as_deref(),
        Some("Address is empty")
    );
    assert_eq!(runtime.state.org_dialog.submit, SubmitControl::Ready);
}

#[tokio::test]
async fn test_signed_out_start_issues_no_requests() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (mut runtime, _tokens) = runtime(&server.uri(), None);
    assert!(!runtime.is_busy());
    runtime.run_until_idle().await;
    assert!(runtime.state.profile().is_none());
}

/// Reads one request head plus its `content-length` body.
async fn read_request(socket: &mut tokio::net::TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let Ok(n) = socket.read(&mut chunk).await else {
            return;
        };
        if n == 0 {
            return;
        }
        buf.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buf);
        if let Some(end) = text.find("\r\n\r\n") {
            let length = text[..end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buf.len() >= end + 4 + length {
                return;
            }
        }
    }
}
