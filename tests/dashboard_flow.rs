use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use jiradash::app::{App, Focus};
use jiradash::config::Config;
use jiradash::event::key::Key;
use jiradash::jira::auth::Credentials;
use jiradash::jira::client::ApiClient;
use jiradash::jira::projects::fetch_user_projects;
use jiradash::session::{LoginOutcome, SessionRecord, SessionStore};
use jiradash::widgets::project_detail::DetailLoad;
use jiradash::widgets::projects::welcome_line;

#[derive(Clone, Debug)]
struct RecordedRequest {
    method: String,
    path: String,
    body: serde_json::Value,
}

type Responder = Arc<dyn Fn(&str, &str) -> (u16, String) + Send + Sync>;

/// Minimal canned HTTP backend: one task per connection, one request per
/// connection, everything recorded for later assertions.
async fn spawn_stub(responder: Responder) -> (String, Arc<Mutex<Vec<RecordedRequest>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub");
    let addr = listener.local_addr().expect("stub addr");
    let requests: Arc<Mutex<Vec<RecordedRequest>>> = Arc::new(Mutex::new(Vec::new()));
    let recorded = requests.clone();

    tokio::spawn(async move {
        loop {
            let (mut socket, _) = match listener.accept().await {
                Ok(conn) => conn,
                Err(_) => return,
            };
            let responder = responder.clone();
            let recorded = recorded.clone();
            tokio::spawn(async move {
                let mut buf: Vec<u8> = Vec::new();
                let mut tmp = [0u8; 1024];
                loop {
                    let n = match socket.read(&mut tmp).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => n,
                    };
                    buf.extend_from_slice(&tmp[..n]);

                    let head_end = match find_subsequence(&buf, b"\r\n\r\n") {
                        Some(pos) => pos,
                        None => continue,
                    };
                    let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
                    let content_length = head
                        .lines()
                        .find_map(|line| {
                            line.to_ascii_lowercase()
                                .strip_prefix("content-length:")
                                .map(|value| value.trim().parse::<usize>().unwrap_or(0))
                        })
                        .unwrap_or(0);

                    let body_start = head_end + 4;
                    while buf.len() < body_start + content_length {
                        let n = match socket.read(&mut tmp).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => n,
                        };
                        buf.extend_from_slice(&tmp[..n]);
                    }
                    let body =
                        String::from_utf8_lossy(&buf[body_start..body_start + content_length])
                            .to_string();

                    let mut request_line = head.lines().next().unwrap_or("").split_whitespace();
                    let method = request_line.next().unwrap_or("").to_string();
                    let path = request_line.next().unwrap_or("").to_string();

                    recorded.lock().unwrap().push(RecordedRequest {
                        method,
                        path: path.clone(),
                        body: serde_json::from_str(&body).unwrap_or(serde_json::Value::Null),
                    });

                    let (status, payload) = responder(&path, &body);
                    let response = format!(
                        "HTTP/1.1 {} OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                        status,
                        payload.len(),
                        payload
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                    return;
                }
            });
        }
    });

    (format!("http://{}", addr), requests)
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn happy_backend() -> Responder {
    Arc::new(|path, _body| match path {
        "/" => (200, r#"{"status":"ok"}"#.to_string()),
        "/api/auth/login" => (
            200,
            r#"{"success":true,"user":{"display_name":"Ann"}}"#.to_string(),
        ),
        "/api/projects" => (
            200,
            r#"{"success":true,"projects":[
                {"id":"10001","key":"PLAT","name":"Platform Core","description":"Shared infrastructure"}
            ]}"#
            .to_string(),
        ),
        "/api/projects/PLAT" => (
            200,
            r#"{"success":true,"project":{
                "id":"10001","key":"PLAT","name":"Platform Core",
                "description":"Shared infrastructure","project_type":"software",
                "components":[{"id":"c1","name":"Gateway","description":"Edge routing","lead":"Sam"}],
                "versions":[{"id":"v1","name":"1.0","released":true,"release_date":"2024-03-15"}]
            }}"#
            .to_string(),
        ),
        _ => (404, r#"{"message":"not found"}"#.to_string()),
    })
}

fn config_for(base_url: &str, session_file: std::path::PathBuf) -> Config {
    let mut config = Config::default();
    config.server_config.base_url = base_url.to_string();
    config.server_config.session_file = Some(session_file);
    config
}

#[tokio::test]
async fn login_end_to_end_uses_the_normalized_domain() {
    let (base_url, requests) = spawn_stub(happy_backend()).await;
    let dir = tempfile::tempdir().unwrap();
    let session_file = dir.path().join("jira_auth.json");

    let client = ApiClient::new(&base_url).unwrap();
    let mut store = SessionStore::init(session_file.clone());

    let outcome = store
        .login(&client, Credentials::new("a@b.com", "t", "acme"))
        .await;
    let user = match outcome {
        LoginOutcome::Success(user) => user,
        LoginOutcome::Failure(message) => panic!("login failed: {}", message),
    };
    assert_eq!(welcome_line(Some(&user)), "Welcome, Ann!");
    assert!(store.is_authenticated());

    // the persisted record is exactly the authenticated pair
    let record: SessionRecord =
        serde_json::from_str(&fs::read_to_string(&session_file).unwrap()).unwrap();
    assert_eq!(record.credentials.domain, "https://acme.atlassian.net");
    assert_eq!(record.user.display_name(), "Ann");

    // the dashboard fetch re-sends the same credentials
    let credentials = store.credentials().unwrap().clone();
    let response = fetch_user_projects(&client, &credentials).await.unwrap();
    assert!(response.success);
    assert_eq!(response.projects.unwrap()[0].key, "PLAT");

    let recorded = requests.lock().unwrap();
    let login = recorded
        .iter()
        .find(|r| r.path == "/api/auth/login")
        .expect("login request recorded");
    assert_eq!(login.method, "POST");
    assert_eq!(login.body["domain"], "https://acme.atlassian.net");
    assert_eq!(login.body["email"], "a@b.com");

    let projects = recorded
        .iter()
        .find(|r| r.path == "/api/projects")
        .expect("projects request recorded");
    assert_eq!(projects.body["domain"], "https://acme.atlassian.net");
}

#[tokio::test]
async fn login_failure_surfaces_the_backend_message() {
    let responder: Responder = Arc::new(|path, _| match path {
        "/api/auth/login" => (
            401,
            r#"{"message":"Invalid API token","error_code":"AUTH_FAILED"}"#.to_string(),
        ),
        _ => (200, "{}".to_string()),
    });
    let (base_url, _requests) = spawn_stub(responder).await;
    let dir = tempfile::tempdir().unwrap();
    let session_file = dir.path().join("jira_auth.json");

    let client = ApiClient::new(&base_url).unwrap();
    let mut store = SessionStore::init(session_file.clone());

    let outcome = store
        .login(&client, Credentials::new("a@b.com", "bad", "acme"))
        .await;
    assert_eq!(
        outcome,
        LoginOutcome::Failure("Invalid API token".to_string())
    );
    assert_eq!(store.error(), Some("Invalid API token"));
    assert!(!session_file.exists(), "no record persisted on failure");
}

#[tokio::test]
async fn login_failure_envelope_with_success_false() {
    let responder: Responder = Arc::new(|path, _| match path {
        "/api/auth/login" => (
            200,
            r#"{"success":false,"message":"Bad credentials"}"#.to_string(),
        ),
        _ => (200, "{}".to_string()),
    });
    let (base_url, _requests) = spawn_stub(responder).await;
    let dir = tempfile::tempdir().unwrap();

    let client = ApiClient::new(&base_url).unwrap();
    let mut store = SessionStore::init(dir.path().join("jira_auth.json"));

    let outcome = store
        .login(&client, Credentials::new("a@b.com", "t", "acme"))
        .await;
    assert_eq!(outcome, LoginOutcome::Failure("Bad credentials".to_string()));
}

#[tokio::test]
async fn transport_failure_normalizes_to_the_network_message() {
    // grab a port that nothing is listening on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let dir = tempfile::tempdir().unwrap();
    let client = ApiClient::new(&format!("http://{}", addr)).unwrap();
    let mut store = SessionStore::init(dir.path().join("jira_auth.json"));

    let outcome = store
        .login(&client, Credentials::new("a@b.com", "t", "acme"))
        .await;
    assert_eq!(
        outcome,
        LoginOutcome::Failure(
            "Unable to connect to server. Please check your connection.".to_string()
        )
    );
}

fn persist_session(session_file: &std::path::Path) {
    let record = SessionRecord {
        user: jiradash::jira::auth::UserSummary {
            display_name: Some("Ann".to_string()),
            ..Default::default()
        },
        credentials: Credentials::new("a@b.com", "t", "acme"),
    };
    fs::write(session_file, serde_json::to_string(&record).unwrap()).unwrap();
}

#[tokio::test]
async fn reselecting_a_project_issues_exactly_two_detail_fetches() {
    let (base_url, requests) = spawn_stub(happy_backend()).await;
    let dir = tempfile::tempdir().unwrap();
    let session_file = dir.path().join("jira_auth.json");
    persist_session(&session_file);

    let mut app = App::new(config_for(&base_url, session_file)).await.unwrap();
    assert_eq!(app.focus, Focus::Projects);
    assert_eq!(app.projects.projects().unwrap().len(), 1);

    // select
    app.event(Key::Enter).await.unwrap();
    assert_eq!(app.focus, Focus::ProjectDetail);
    assert!(matches!(
        app.project_detail.detail(),
        Some(DetailLoad::Ready(_))
    ));

    // deselect leaves no residual detail state
    app.event(Key::Esc).await.unwrap();
    assert_eq!(app.focus, Focus::Projects);
    assert!(app.project_detail.detail().is_none());
    assert!(app.project_detail.selected().is_none());

    // select the same project again: nothing was cached
    app.event(Key::Enter).await.unwrap();
    assert!(matches!(
        app.project_detail.detail(),
        Some(DetailLoad::Ready(_))
    ));

    let recorded = requests.lock().unwrap();
    let detail_fetches = recorded
        .iter()
        .filter(|r| r.path == "/api/projects/PLAT")
        .count();
    assert_eq!(detail_fetches, 2);
}

#[tokio::test]
async fn list_failure_then_retry_reissues_the_identical_request() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let attempts_in_responder = attempts.clone();
    let responder: Responder = Arc::new(move |path, _| match path {
        "/" => (200, "{}".to_string()),
        "/api/projects" => {
            if attempts_in_responder.fetch_add(1, Ordering::SeqCst) == 0 {
                (500, r#"{"message":"upstream down"}"#.to_string())
            } else {
                (
                    200,
                    r#"{"success":true,"projects":[{"id":"10001","key":"PLAT","name":"Platform Core"}]}"#
                        .to_string(),
                )
            }
        }
        _ => (404, r#"{"message":"not found"}"#.to_string()),
    });
    let (base_url, requests) = spawn_stub(responder).await;
    let dir = tempfile::tempdir().unwrap();
    let session_file = dir.path().join("jira_auth.json");
    persist_session(&session_file);

    let mut app = App::new(config_for(&base_url, session_file)).await.unwrap();
    assert!(app.projects.is_failed());
    assert_eq!(app.projects.error_message(), Some("upstream down"));

    // the retry key re-runs the same fetch
    app.event(Key::Char('r')).await.unwrap();
    assert!(!app.projects.is_failed());
    assert!(app.projects.error_message().is_none());
    assert_eq!(app.projects.projects().unwrap().len(), 1);

    let recorded = requests.lock().unwrap();
    let project_requests: Vec<&RecordedRequest> = recorded
        .iter()
        .filter(|r| r.path == "/api/projects")
        .collect();
    assert_eq!(project_requests.len(), 2);
    assert_eq!(project_requests[0].body, project_requests[1].body);
}

#[tokio::test]
async fn logout_clears_the_session_and_the_record() {
    let (base_url, _requests) = spawn_stub(happy_backend()).await;
    let dir = tempfile::tempdir().unwrap();
    let session_file = dir.path().join("jira_auth.json");
    persist_session(&session_file);

    let mut app = App::new(config_for(&base_url, session_file.clone()))
        .await
        .unwrap();
    assert_eq!(app.focus, Focus::Projects);

    app.event(Key::Char('o')).await.unwrap();
    assert_eq!(app.focus, Focus::Login);
    assert!(!app.session.is_authenticated());
    assert!(app.session.error().is_none());
    assert!(!session_file.exists(), "logout erases the stored record");
}
