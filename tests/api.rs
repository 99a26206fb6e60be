//! Drives the assembled service in-process, through the full middleware chain.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::{Value, json};
use userbase::middleware::{Authentication, ErrorHandling, Logging, Stack};
use userbase::{
    BoxedHandler, ErasedHandler, Method, Request, Response, Router, Status, UserStore,
};

const AUTH: &str = "Bearer valid_token";

struct TestApp {
    app: BoxedHandler,
    store: Arc<UserStore>,
}

impl TestApp {
    fn new() -> Self {
        let store = Arc::new(UserStore::seeded());
        let app = userbase::app(Arc::clone(&store), "valid_token");
        Self { app, store }
    }

    async fn send(&self, method: Method, path: &str, body: Option<Value>) -> Response {
        let mut req = Request::new(method, path).with_header("Authorization", AUTH);
        if let Some(body) = body {
            req = req.with_body(body.to_string());
        }
        self.app.call(req).await.expect("ErrorHandling never yields Err")
    }
}

fn json_body(res: &Response) -> Value {
    serde_json::from_slice(res.body()).expect("body is JSON")
}

// ── Validation ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn blank_names_are_rejected_on_create_and_update() {
    let t = TestApp::new();
    for name in ["", "   "] {
        let res = t.send(Method::Post, "/users", Some(json!({ "name": name, "age": 30 }))).await;
        assert_eq!(res.status_code(), 400);
        assert_eq!(json_body(&res), json!({ "error": "name cannot be empty" }));

        let res = t.send(Method::Put, "/users/1", Some(json!({ "name": name, "age": 30 }))).await;
        assert_eq!(res.status_code(), 400);
        assert_eq!(json_body(&res), json!({ "error": "name cannot be empty" }));
    }
    assert_eq!(t.store.get(1).unwrap().unwrap().name, "Alice");
}

#[tokio::test]
async fn numeric_names_are_rejected() {
    let t = TestApp::new();
    let res = t.send(Method::Post, "/users", Some(json!({ "name": "12345", "age": 30 }))).await;
    assert_eq!(res.status_code(), 400);
    assert_eq!(json_body(&res), json!({ "error": "name cannot be numbers" }));
}

#[tokio::test]
async fn age_boundaries_on_create() {
    let t = TestApp::new();
    for (age, expected) in [(0, 400), (151, 400), (-1, 400), (1, 201), (150, 201)] {
        let res = t.send(Method::Post, "/users", Some(json!({ "name": "Ann", "age": age }))).await;
        assert_eq!(res.status_code(), expected, "age {age}");
        if expected == 400 {
            assert_eq!(json_body(&res), json!({ "error": "age out of range" }));
        }
    }
}

// ── CRUD ──────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_returns_the_seed() {
    let t = TestApp::new();
    let res = t.send(Method::Get, "/users", None).await;
    assert_eq!(res.status_code(), 200);
    assert_eq!(res.header("content-type"), Some("application/json"));
    let ids: Vec<u64> = json_body(&res)
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn get_is_idempotent() {
    let t = TestApp::new();
    let first = t.send(Method::Get, "/users/2", None).await;
    let second = t.send(Method::Get, "/users/2", None).await;
    assert_eq!(first.status_code(), 200);
    assert_eq!(first.body(), second.body());
}

#[tokio::test]
async fn create_assigns_the_next_id() {
    let t = TestApp::new();
    let res = t.send(Method::Post, "/users", Some(json!({ "name": "Dana", "age": 40 }))).await;
    assert_eq!(res.status_code(), 201);
    assert_eq!(res.header("location"), Some("/users/4"));
    assert_eq!(json_body(&res), json!({ "id": 4, "name": "Dana", "age": 40 }));
}

#[tokio::test]
async fn create_then_get_round_trips() {
    let t = TestApp::new();
    let created = t
        .send(Method::Post, "/users", Some(json!({ "id": 999, "name": "Erin", "age": 52 })))
        .await;
    let location = created.header("location").unwrap().to_owned();
    let id = json_body(&created)["id"].as_u64().unwrap();
    assert_eq!(location, format!("/users/{id}"));
    assert_ne!(id, 999);

    let fetched = t.send(Method::Get, &location, None).await;
    assert_eq!(fetched.status_code(), 200);
    assert_eq!(json_body(&fetched), json!({ "id": id, "name": "Erin", "age": 52 }));
}

#[tokio::test]
async fn update_replaces_and_keeps_the_id() {
    let t = TestApp::new();
    let res = t
        .send(Method::Put, "/users/2", Some(json!({ "id": 7, "name": "Bobby", "age": 31 })))
        .await;
    assert_eq!(res.status_code(), 204);
    assert!(res.body().is_empty());

    let res = t.send(Method::Get, "/users/2", None).await;
    assert_eq!(json_body(&res), json!({ "id": 2, "name": "Bobby", "age": 31 }));
}

#[tokio::test]
async fn delete_removes_the_user() {
    let t = TestApp::new();
    assert_eq!(t.send(Method::Delete, "/users/3", None).await.status_code(), 204);
    assert_eq!(t.send(Method::Get, "/users/3", None).await.status_code(), 404);
    assert_eq!(t.send(Method::Delete, "/users/3", None).await.status_code(), 404);
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let t = TestApp::new();
    let valid = Some(json!({ "name": "Ghost", "age": 20 }));
    for (method, body) in [
        (Method::Get, None),
        (Method::Put, valid),
        (Method::Delete, None),
    ] {
        let res = t.send(method.clone(), "/users/9999", body).await;
        assert_eq!(res.status_code(), 404, "{method}");
        assert!(json_body(&res)["error"].is_string());
    }
}

#[tokio::test]
async fn welcome_route_is_behind_auth_too() {
    let t = TestApp::new();
    let res = t.send(Method::Get, "/", None).await;
    assert_eq!(res.status_code(), 200);
    assert_eq!(res.body(), userbase::routes::WELCOME.as_bytes());

    let res = t.app.call(Request::new(Method::Get, "/")).await.unwrap();
    assert_eq!(res.status_code(), 401);
}

// ── Authentication ────────────────────────────────────────────────────────────

#[tokio::test]
async fn unauthenticated_delete_does_not_touch_the_store() {
    let t = TestApp::new();
    for auth in [None, Some("Bearer wrong"), Some("Bearer")] {
        let mut req = Request::new(Method::Delete, "/users/1");
        if let Some(auth) = auth {
            req = req.with_header("Authorization", auth);
        }
        let res = t.app.call(req).await.unwrap();
        assert_eq!(res.status_code(), 401);
        assert_eq!(json_body(&res), json!({ "error": "Unauthorized" }));
    }
    assert!(t.store.get(1).unwrap().is_some());
}

#[tokio::test]
async fn unmatched_paths_need_auth_before_404() {
    let t = TestApp::new();
    let res = t.app.call(Request::new(Method::Get, "/nowhere")).await.unwrap();
    assert_eq!(res.status_code(), 401);

    let res = t.send(Method::Get, "/nowhere", None).await;
    assert_eq!(res.status_code(), 404);
}

#[tokio::test]
async fn nonstandard_methods_need_auth_before_405() {
    let t = TestApp::new();
    let res = t.app.call(Request::new(Method::from("PURGE"), "/users")).await.unwrap();
    assert_eq!(res.status_code(), 401);
    assert_eq!(json_body(&res), json!({ "error": "Unauthorized" }));

    let res = t.send(Method::from("PURGE"), "/users", None).await;
    assert_eq!(res.status_code(), 405);
    assert_eq!(json_body(&res), json!({ "error": "Method not allowed" }));
}

// ── Fault isolation ───────────────────────────────────────────────────────────

fn faulty_app(calls: Arc<AtomicUsize>) -> BoxedHandler {
    let router = Router::new().on(Method::Get, "/explode", move |_req: Request| {
        calls.fetch_add(1, Ordering::SeqCst);
        async {
            if true {
                panic!("db password is hunter2");
            }
            Status::Ok
        }
    });
    Stack::new()
        .layer(ErrorHandling)
        .layer(Authentication::new("valid_token"))
        .layer(Logging)
        .service(router.into_handler())
}

#[tokio::test]
async fn faults_become_a_generic_500() {
    let calls = Arc::new(AtomicUsize::new(0));
    let app = faulty_app(Arc::clone(&calls));

    let req = Request::new(Method::Get, "/explode").with_header("Authorization", AUTH);
    let res = app.call(req).await.expect("contained");

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(res.status_code(), 500);
    assert_eq!(json_body(&res), json!({ "error": "Internal server error." }));
    assert!(!String::from_utf8_lossy(res.body()).contains("hunter2"));
}

#[tokio::test]
async fn the_service_keeps_answering_after_a_fault() {
    let calls = Arc::new(AtomicUsize::new(0));
    let app = faulty_app(Arc::clone(&calls));

    for _ in 0..3 {
        let req = Request::new(Method::Get, "/explode").with_header("Authorization", AUTH);
        assert_eq!(app.call(req).await.unwrap().status_code(), 500);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}
