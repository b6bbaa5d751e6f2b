use schooldash::api::{
  ApiError, BootstrapFetch, Credential, DashboardApi, DashboardClient, TenantContext, TenantId,
};
use schooldash::cache::{BootstrapCache, SqliteStorage};
use schooldash::sync::{AuthGate, BootstrapPhase, BootstrapSync, DashboardState};
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const ETAG: &str = "\"v1\"";
const BOOTSTRAP_BODY: &str = r#"{
  "user": {
    "id": "u1",
    "displayName": "Ada",
    "email": "ada@lincoln.edu",
    "role": "admin",
    "teamIds": ["ops"]
  },
  "tickets": [{"id": "t1", "title": "Projector broken"}],
  "events": [{"id": "e1", "name": "Open house"}],
  "org": {"name": "Lincoln High", "timezone": "America/Chicago"}
}"#;

#[derive(Default)]
struct Recorded {
  requests: Mutex<Vec<String>>,
  bootstrap_calls: AtomicUsize,
}

impl Recorded {
  fn last_request(&self) -> String {
    self.requests.lock().unwrap().last().cloned().unwrap_or_default()
  }
}

fn response(status: &str, headers: &[(&str, &str)], body: &str) -> String {
  let mut out = format!(
    "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n",
    status,
    body.len()
  );
  for (name, value) in headers {
    out.push_str(&format!("{}: {}\r\n", name, value));
  }
  out.push_str("\r\n");
  out.push_str(body);
  out
}

/// Minimal dashboard server on a loopback port. Routes:
/// - `/api/...` honours `If-None-Match` and sends an ETag
/// - `/plain/bootstrap` sends no ETag
/// - `/down/...` always answers 500
async fn spawn_server() -> (String, Arc<Recorded>) {
  let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind listener");
  let addr = listener.local_addr().expect("addr");
  let recorded = Arc::new(Recorded::default());

  let state = Arc::clone(&recorded);
  tokio::spawn(async move {
    loop {
      let (mut stream, _) = match listener.accept().await {
        Ok(v) => v,
        Err(_) => break,
      };
      let mut req = vec![0u8; 8192];
      let n = stream.read(&mut req).await.expect("read req");
      let req_text = String::from_utf8_lossy(&req[..n]).to_string();
      let path = req_text
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or_default()
        .to_string();
      let if_none_match = req_text
        .lines()
        .find(|l| l.to_ascii_lowercase().starts_with("if-none-match:"))
        .and_then(|l| l.split_once(':'))
        .map(|(_, v)| v.trim().to_string());
      state.requests.lock().unwrap().push(req_text);

      let reply = match path.as_str() {
        "/api/bootstrap" => {
          state.bootstrap_calls.fetch_add(1, Ordering::SeqCst);
          if if_none_match.as_deref() == Some(ETAG) {
            response("304 Not Modified", &[("ETag", ETAG)], "")
          } else {
            let headers = [("ETag", ETAG), ("Content-Type", "application/json")];
            response("200 OK", &headers, BOOTSTRAP_BODY)
          }
        }
        "/plain/bootstrap" => {
          response("200 OK", &[("Content-Type", "application/json")], BOOTSTRAP_BODY)
        }
        "/api/tickets" => response(
          "200 OK",
          &[("Content-Type", "application/json")],
          r#"[{"id": "t1", "title": "Projector broken"}, {"id": "t2", "subject": "Wifi"}]"#,
        ),
        "/api/admin/users" => response(
          "200 OK",
          &[("Content-Type", "application/json")],
          r#"[
            {"id": "u1", "displayName": "Ada", "role": "admin"},
            {"id": "u2", "name": "Bo", "role": "janitor"}
          ]"#,
        ),
        _ => response("500 Internal Server Error", &[], ""),
      };
      let _ = stream.write_all(reply.as_bytes()).await;
      let _ = stream.shutdown().await;
    }
  });

  (format!("http://{}", addr), recorded)
}

fn client(base: &str, credential: Option<&str>) -> DashboardClient {
  let context = TenantContext::new(TenantId::new("lincoln"), credential.and_then(Credential::new));
  DashboardClient::new(base, context, Duration::from_secs(5)).expect("client")
}

#[tokio::test]
async fn bootstrap_returns_snapshot_and_etag() {
  let (base, recorded) = spawn_server().await;
  let api = client(&format!("{}/api", base), Some("secret"));

  match api.fetch_bootstrap(None).await {
    BootstrapFetch::Fresh { snapshot, token } => {
      assert_eq!(token, ETAG);
      assert_eq!(snapshot.tickets.len(), 1);
      assert_eq!(snapshot.user.as_ref().map(|u| u.name.as_str()), Some("Ada"));
      assert_eq!(snapshot.org.as_ref().map(|o| o.name.as_str()), Some("Lincoln High"));
    }
    other => panic!("expected fresh data, got {:?}", other),
  }

  let request = recorded.last_request().to_ascii_lowercase();
  assert!(request.contains("authorization: bearer secret"));
  assert!(!request.contains("x-tenant:"));
  assert!(!request.contains("if-none-match:"));
}

#[tokio::test]
async fn bootstrap_with_current_token_is_not_modified() {
  let (base, recorded) = spawn_server().await;
  let api = client(&format!("{}/api/", base), Some("secret"));

  assert!(matches!(api.fetch_bootstrap(Some(ETAG)).await, BootstrapFetch::NotModified));
  assert!(recorded.last_request().to_ascii_lowercase().contains("if-none-match: \"v1\""));
}

#[tokio::test]
async fn bootstrap_without_etag_hashes_body() {
  let (base, _) = spawn_server().await;
  let api = client(&format!("{}/plain", base), Some("secret"));

  match api.fetch_bootstrap(None).await {
    BootstrapFetch::Fresh { token, .. } => {
      assert_eq!(token, hex::encode(Sha256::digest(BOOTSTRAP_BODY.as_bytes())));
    }
    other => panic!("expected fresh data, got {:?}", other),
  }
}

#[tokio::test]
async fn server_error_maps_to_failed() {
  let (base, _) = spawn_server().await;
  let api = client(&format!("{}/down", base), Some("secret"));

  assert!(matches!(
    api.fetch_bootstrap(None).await,
    BootstrapFetch::Failed(ApiError::Status(500))
  ));
  assert!(matches!(api.tickets().await, Err(ApiError::Status(500))));
}

#[tokio::test]
async fn unreachable_server_maps_to_failed() {
  let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind listener");
  let addr = listener.local_addr().expect("addr");
  drop(listener);

  let api = client(&format!("http://{}/api", addr), Some("secret"));
  assert!(matches!(api.fetch_bootstrap(None).await, BootstrapFetch::Failed(_)));
}

#[tokio::test]
async fn lists_use_tenant_header_without_credential() {
  let (base, recorded) = spawn_server().await;
  let api = client(&format!("{}/api", base), None);

  let tickets = api.tickets().await.expect("tickets");
  assert_eq!(tickets.len(), 2);

  let request = recorded.last_request().to_ascii_lowercase();
  assert!(request.contains("x-tenant: lincoln"));
  assert!(!request.contains("authorization:"));
}

#[tokio::test]
async fn admin_users_are_projected_to_summaries() {
  let (base, _) = spawn_server().await;
  let api = client(&format!("{}/api", base), Some("secret"));

  let users = api.admin_users().await.expect("users");
  assert_eq!(users.len(), 2);
  assert!(users[0].is_admin());
  assert!(!users[1].is_admin());
  assert_eq!(users[1].name, "Bo");
}

#[tokio::test]
async fn second_start_hydrates_from_disk_and_revalidates_conditionally() {
  let (base, recorded) = spawn_server().await;
  let dir = tempfile::tempdir().expect("tempdir");
  let db = dir.path().join("cache.db");
  let tenant = TenantId::new("lincoln");

  // Cold start: nothing cached, server sends everything
  {
    let api: Arc<dyn DashboardApi> = Arc::new(client(&format!("{}/api", base), Some("secret")));
    let cache = BootstrapCache::new(Arc::new(SqliteStorage::open_at(&db).expect("db")), &tenant);
    let mut sync = BootstrapSync::new(api, cache, AuthGate::Open);
    let mut state = DashboardState::default();

    assert!(!sync.start(&mut state));
    assert_eq!(sync.settle(&mut state).await, BootstrapPhase::Settled);
    assert_eq!(state.tickets.len(), 1);
  }

  // Warm start: data is shown before the request completes, then a 304
  {
    let api: Arc<dyn DashboardApi> = Arc::new(client(&format!("{}/api", base), Some("secret")));
    let cache = BootstrapCache::new(Arc::new(SqliteStorage::open_at(&db).expect("db")), &tenant);
    let mut sync = BootstrapSync::new(api, cache.clone(), AuthGate::Open);
    let mut state = DashboardState::default();

    assert!(sync.start(&mut state));
    assert_eq!(state.tickets.len(), 1);
    assert_eq!(state.events.len(), 1);
    let tickets = state.tickets.clone();

    assert_eq!(sync.settle(&mut state).await, BootstrapPhase::Settled);
    assert!(Arc::ptr_eq(&tickets, &state.tickets));
    assert_eq!(cache.read_freshness_token().as_deref(), Some(ETAG));
  }

  assert_eq!(recorded.bootstrap_calls.load(Ordering::SeqCst), 2);
  assert!(recorded.last_request().to_ascii_lowercase().contains("if-none-match: \"v1\""));
}
