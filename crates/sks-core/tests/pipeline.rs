//! Request pipeline behavior against a mock booking API.

use std::net::TcpListener;
use std::sync::Arc;

use serde_json::{Value, json};
use sks_core::api::{ApiClient, ApiErrorKind};
use sks_core::navigation::{
    Decision, NavigationGuard, NavigationRequest, Navigator, Notifier, RecordingNavigator,
    RecordingNotifier, View,
};
use sks_core::session::{SessionStore, SyncOutcome, TOKEN_KEY};
use sks_core::storage::{MemoryStorage, Storage};
use wiremock::matchers::{body_json, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockBuilder, MockServer, ResponseTemplate};

fn can_bind_localhost() -> bool {
    TcpListener::bind("127.0.0.1:0").is_ok()
}

struct Harness {
    storage: Arc<MemoryStorage>,
    session: Arc<SessionStore>,
    navigator: Arc<RecordingNavigator>,
    api: Arc<ApiClient>,
}

fn harness(base_url: &str, token: Option<&str>, role: &str) -> Harness {
    let storage = Arc::new(MemoryStorage::new());
    let session = Arc::new(SessionStore::restore(
        Arc::clone(&storage) as Arc<dyn Storage>
    ));
    if let Some(token) = token {
        session
            .login(&json!({
                "token": token,
                "user_id": 1,
                "username": "ann",
                "role": role,
            }))
            .unwrap();
    }
    let navigator = Arc::new(RecordingNavigator::default());
    let api = Arc::new(
        ApiClient::new(
            &format!("{base_url}/api"),
            None,
            Arc::clone(&session),
            Arc::clone(&navigator) as Arc<dyn Navigator>,
        )
        .unwrap(),
    );
    Harness {
        storage,
        session,
        navigator,
        api,
    }
}

fn envelope(code: i64, data: Value, message: &str) -> Value {
    let mut body = json!({ "code": code, "message": message });
    body["data"] = data;
    body
}

#[tokio::test]
async fn test_success_envelope_yields_data() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/scripts/hot"))
        .and(query_param("limit", "3"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(envelope(200, json!({"x": 1}), "ok")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server.uri(), None, "player");
    let data = h.api.scripts().hot(3).await.unwrap();
    assert_eq!(data, json!({"x": 1}));
}

#[tokio::test]
async fn test_envelope_failure_surfaces_server_message() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/scripts"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(envelope(500, Value::Null, "boom")),
        )
        .mount(&server)
        .await;

    let h = harness(&server.uri(), None, "player");
    let err = h.api.scripts().list(None).await.unwrap_err();
    assert_eq!(err.kind, ApiErrorKind::ServerRejected);
    assert_eq!(err.message, "boom");
}

#[tokio::test]
async fn test_credential_attached_only_when_logged_in() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/my/orders"))
        .and(header("authorization", "Bearer tok-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(200, json!([]), "")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/scripts"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/scripts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(200, json!([]), "")))
        .mount(&server)
        .await;

    let logged_in = harness(&server.uri(), Some("tok-abc"), "player");
    assert_eq!(logged_in.api.orders().mine().await.unwrap(), json!([]));

    let anonymous = harness(&server.uri(), None, "player");
    assert_eq!(anonymous.api.scripts().list(None).await.unwrap(), json!([]));
}

#[tokio::test]
async fn test_unauthorized_clears_session_and_redirects() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/my/locks"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let h = harness(&server.uri(), Some("stale"), "player");
    let err = h.api.locks().mine().await.unwrap_err();

    assert_eq!(err.kind, ApiErrorKind::Unauthorized);
    assert!(!h.session.is_logged_in());
    assert_eq!(h.session.profile(), None);
    assert_eq!(h.storage.get_item(TOKEN_KEY).unwrap(), None);
    assert_eq!(h.navigator.redirects(), vec![View::Login]);

    // The next guarded navigation already sees the cleared session.
    let guard = NavigationGuard::new(
        Arc::clone(&h.session),
        Arc::clone(&h.api),
        Arc::new(RecordingNotifier::default()) as Arc<dyn Notifier>,
    );
    let decision = guard
        .evaluate(&NavigationRequest::for_view(View::MyLocks))
        .await;
    assert_eq!(decision, Decision::RedirectLogin);
}

#[tokio::test]
async fn test_status_codes_map_to_messages() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/admin/dms"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/scripts/99"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/locks"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(envelope(400, Value::Null, "seat already locked")),
        )
        .mount(&server)
        .await;

    let h = harness(&server.uri(), Some("tok"), "player");

    let forbidden = h.api.admin().dms().await.unwrap_err();
    assert_eq!(forbidden.kind, ApiErrorKind::Forbidden);
    assert_eq!(forbidden.message, "access denied");

    let missing = h.api.scripts().get("99").await.unwrap_err();
    assert_eq!(missing.kind, ApiErrorKind::NotFound);
    assert_eq!(missing.message, "resource not found");

    let rejected = h.api.locks().create(&json!(5)).await.unwrap_err();
    assert_eq!(rejected.kind, ApiErrorKind::ServerRejected);
    assert_eq!(rejected.message, "seat already locked");

    // None of these end the session.
    assert!(h.session.is_logged_in());
    assert!(h.navigator.redirects().is_empty());
}

#[tokio::test]
async fn test_transport_failure() {
    let port = match TcpListener::bind("127.0.0.1:0") {
        Ok(listener) => listener.local_addr().unwrap().port(),
        Err(_) => {
            eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
            return;
        }
    };

    let h = harness(&format!("http://127.0.0.1:{port}"), Some("tok"), "player");
    let err = h.api.scripts().list(None).await.unwrap_err();
    assert_eq!(err.kind, ApiErrorKind::Transport);
    assert!(h.session.is_logged_in());
}

#[tokio::test]
async fn test_sync_user_info_over_http() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/me"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            200,
            json!({"User_ID": 1, "UserName": "ann", "Role": "staff", "Ref_ID": 12}),
            "ok",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server.uri(), Some("tok"), "player");
    let outcome = h.session.sync_user_info(h.api.as_ref()).await;

    assert!(outcome.is_updated(), "{outcome:?}");
    assert!(h.session.is_staff());
    assert_eq!(h.session.ref_id().as_deref(), Some("12"));
    assert_eq!(h.session.token(), "tok");
}

#[tokio::test]
async fn test_sync_without_token_makes_no_call() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/me"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let h = harness(&server.uri(), None, "player");
    assert_eq!(
        h.session.sync_user_info(h.api.as_ref()).await,
        SyncOutcome::Unchanged
    );
}

#[tokio::test]
async fn test_guard_refreshes_role_from_server() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            200,
            json!({"user_id": 1, "username": "ann", "role": "player"}),
            "ok",
        )))
        .mount(&server)
        .await;

    // Stored role says staff; the server disagrees.
    let h = harness(&server.uri(), Some("tok"), "staff");
    let notifier = Arc::new(RecordingNotifier::default());
    let guard = NavigationGuard::new(
        Arc::clone(&h.session),
        Arc::clone(&h.api),
        Arc::clone(&notifier) as Arc<dyn Notifier>,
    );

    let decision = guard
        .evaluate(&NavigationRequest::for_view(View::AdminDashboard))
        .await;

    assert_eq!(decision, Decision::RedirectHome);
    let notes = notifier.take();
    assert_eq!(notes.len(), 1);
    assert!(notes[0].message.contains("player"));
}

/// Mounts a route that must be hit exactly once and answers with `tag` as data.
async fn mount_route(server: &MockServer, builder: MockBuilder, tag: &str) {
    builder
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(200, json!(tag), "ok")))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_auth_order_and_lock_wrappers_hit_their_routes() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    let h = harness(&server.uri(), Some("tok-player"), "player");

    mount_route(
        &server,
        Mock::given(method("POST"))
            .and(path("/api/auth/register"))
            .and(body_json(json!({
                "username": "cat",
                "phone": "13800000000",
                "password": "pw",
                "role": "player",
            }))),
        "register-default",
    )
    .await;
    mount_route(
        &server,
        Mock::given(method("POST"))
            .and(path("/api/auth/register"))
            .and(body_json(json!({
                "username": "dm1",
                "phone": "13900000000",
                "password": "pw",
                "role": "staff",
            }))),
        "register-staff",
    )
    .await;
    mount_route(
        &server,
        Mock::given(method("POST"))
            .and(path("/api/orders"))
            .and(header("authorization", "Bearer tok-player"))
            .and(body_json(json!({"schedule_id": 12}))),
        "order-create",
    )
    .await;
    mount_route(
        &server,
        Mock::given(method("POST"))
            .and(path("/api/orders/31/pay"))
            .and(body_json(json!({"channel": 1}))),
        "order-pay",
    )
    .await;
    mount_route(
        &server,
        Mock::given(method("POST")).and(path("/api/orders/31/cancel")),
        "order-cancel",
    )
    .await;
    mount_route(
        &server,
        Mock::given(method("GET"))
            .and(path("/api/admin/orders"))
            .and(query_param("status", "paid")),
        "order-admin",
    )
    .await;
    mount_route(
        &server,
        Mock::given(method("POST")).and(path("/api/locks/8/cancel")),
        "lock-cancel",
    )
    .await;
    mount_route(
        &server,
        Mock::given(method("GET"))
            .and(path("/api/admin/locks"))
            .and(query_param("status", "active")),
        "lock-admin",
    )
    .await;

    let auth = h.api.auth();
    assert_eq!(
        auth.register("cat", "13800000000", "pw", "").await.unwrap(),
        "register-default"
    );
    assert_eq!(
        auth.register("dm1", "13900000000", "pw", "staff").await.unwrap(),
        "register-staff"
    );

    let orders = h.api.orders();
    assert_eq!(orders.create(&json!(12)).await.unwrap(), "order-create");
    assert_eq!(orders.pay("31", 1).await.unwrap(), "order-pay");
    assert_eq!(orders.cancel("31").await.unwrap(), "order-cancel");
    assert_eq!(
        orders
            .list_admin(&[("status", "paid".to_string())])
            .await
            .unwrap(),
        "order-admin"
    );

    let locks = h.api.locks();
    assert_eq!(locks.cancel("8").await.unwrap(), "lock-cancel");
    assert_eq!(
        locks
            .list_admin(&[("status", "active".to_string())])
            .await
            .unwrap(),
        "lock-admin"
    );
}

#[tokio::test]
async fn test_schedule_wrappers_hit_their_routes() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    let h = harness(&server.uri(), Some("tok-staff"), "staff");
    let schedule = json!({"script_id": 5, "room_id": 2, "start_time": "2024-06-01 19:00"});

    mount_route(
        &server,
        Mock::given(method("GET"))
            .and(path("/api/scripts/5/schedules"))
            .and(query_param("player_id", "9")),
        "by-script",
    )
    .await;
    mount_route(
        &server,
        Mock::given(method("GET"))
            .and(path("/api/admin/schedules"))
            .and(query_param("date", "2024-06-01")),
        "schedule-admin",
    )
    .await;
    mount_route(
        &server,
        Mock::given(method("POST"))
            .and(path("/api/admin/schedules"))
            .and(body_json(schedule.clone())),
        "schedule-create",
    )
    .await;
    mount_route(
        &server,
        Mock::given(method("PUT"))
            .and(path("/api/admin/schedules/7"))
            .and(body_json(schedule.clone())),
        "schedule-update",
    )
    .await;
    mount_route(
        &server,
        Mock::given(method("POST")).and(path("/api/admin/schedules/7/cancel")),
        "schedule-cancel",
    )
    .await;

    let schedules = h.api.schedules();
    assert_eq!(
        schedules.by_script("5", Some("9")).await.unwrap(),
        "by-script"
    );
    assert_eq!(
        schedules
            .list_admin(&[("date", "2024-06-01".to_string())])
            .await
            .unwrap(),
        "schedule-admin"
    );
    assert_eq!(
        schedules.create(&schedule).await.unwrap(),
        "schedule-create"
    );
    assert_eq!(
        schedules.update("7", &schedule).await.unwrap(),
        "schedule-update"
    );
    assert_eq!(schedules.cancel("7").await.unwrap(), "schedule-cancel");
}

#[tokio::test]
async fn test_admin_and_report_wrappers_hit_their_routes() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    let h = harness(&server.uri(), Some("tok-boss"), "boss");

    mount_route(
        &server,
        Mock::given(method("GET")).and(path("/api/admin/rooms")),
        "rooms",
    )
    .await;
    mount_route(
        &server,
        Mock::given(method("GET")).and(path("/api/admin/db-objects")),
        "db-objects",
    )
    .await;
    for (route, tag) in [
        ("/api/admin/dashboard", "dashboard"),
        ("/api/admin/reports/top-scripts", "top-scripts"),
        ("/api/admin/reports/room-utilization", "room-utilization"),
        ("/api/admin/reports/lock-conversion", "lock-conversion"),
        ("/api/admin/reports/dm-performance", "dm-performance"),
    ] {
        mount_route(
            &server,
            Mock::given(method("GET"))
                .and(path(route))
                .and(query_param("start_date", "2024-06-01"))
                .and(query_param("end_date", "2024-06-30")),
            tag,
        )
        .await;
    }

    let admin = h.api.admin();
    assert_eq!(admin.rooms().await.unwrap(), "rooms");
    assert_eq!(admin.db_objects().await.unwrap(), "db-objects");

    let range = [
        ("start_date", "2024-06-01".to_string()),
        ("end_date", "2024-06-30".to_string()),
    ];
    let reports = h.api.reports();
    assert_eq!(reports.dashboard(&range).await.unwrap(), "dashboard");
    assert_eq!(reports.top_scripts(&range).await.unwrap(), "top-scripts");
    assert_eq!(
        reports.room_utilization(&range).await.unwrap(),
        "room-utilization"
    );
    assert_eq!(
        reports.lock_conversion(&range).await.unwrap(),
        "lock-conversion"
    );
    assert_eq!(
        reports.dm_performance(&range).await.unwrap(),
        "dm-performance"
    );
}
