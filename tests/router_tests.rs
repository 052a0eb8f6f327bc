//! Tests for the registration facade and the engine-scope contract.
//!
//! # Test Coverage
//!
//! - Group prefixes compose through nested scopes
//! - Sub-scopes inherit the parent scope's renderer
//! - `any` registers the handler under every verb
//! - Middleware passes through to the engine in order and can short-circuit
//! - Static file/dir registrations reach the engine untouched

mod common;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use common::{RecordingEngine, StaticEntry, TestTracing};
use flexroute::{CanonicalHandler, HeaderVec, Outcome, Renderer, RequestContext, Router};
use http::Method;
use serde_json::json;

#[test]
fn test_group_prefixes_compose() {
    let _tracing = TestTracing::init();
    let engine = RecordingEngine::new();
    let mut router = Router::new(engine.clone());
    router.get("/health", || -> &'static str { "ok" });

    let mut api = router.group("/api", Vec::new());
    api.get("/pets", || -> &'static str { "pets" });

    let mut admin = api.group("/admin", Vec::new());
    admin.get("/settings", || -> &'static str { "settings" });

    let registered = engine.registered();
    assert!(registered.contains(&(Method::GET, "/health".to_string())));
    assert!(registered.contains(&(Method::GET, "/api/pets".to_string())));
    assert!(registered.contains(&(Method::GET, "/api/admin/settings".to_string())));

    let resp = engine
        .dispatch(Method::GET, "/api/admin/settings", HeaderVec::new(), None)
        .unwrap();
    assert_eq!(resp.body_str(), "settings");
}

struct FlatRenderer;

impl Renderer for FlatRenderer {
    fn render(&self, ctx: &mut RequestContext, outcome: Outcome) {
        match outcome {
            Outcome::Payload(value) => ctx.write_json(200, &json!({ "flat": value })),
            _ => ctx.write_json(200, &json!({ "flat": null })),
        }
    }
}

#[test]
fn test_subscope_inherits_renderer() {
    let _tracing = TestTracing::init();
    let engine = RecordingEngine::new();
    let mut router = Router::with_renderer(engine.clone(), Arc::new(FlatRenderer));
    let mut api = router.group("/api", Vec::new());
    api.get("/pets", || -> &'static str { "pets" });

    let resp = engine
        .dispatch(Method::GET, "/api/pets", HeaderVec::new(), None)
        .unwrap();
    assert_eq!(resp.body_json(), Some(json!({"flat": "pets"})));
}

#[test]
fn test_any_registers_every_verb() {
    let _tracing = TestTracing::init();
    let engine = RecordingEngine::new();
    let mut router = Router::new(engine.clone());
    router.any("/mirror", || -> &'static str { "mirror" });

    assert_eq!(engine.route_count(), 7);
    for method in [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::PATCH,
        Method::HEAD,
        Method::OPTIONS,
    ] {
        let resp = engine
            .dispatch(method.clone(), "/mirror", HeaderVec::new(), None)
            .unwrap();
        assert_eq!(resp.body_str(), "mirror", "method {method}");
    }
}

#[test]
fn test_middleware_runs_in_order_before_handler() {
    let _tracing = TestTracing::init();
    let engine = RecordingEngine::new();
    let mut router = Router::new(engine.clone());

    let log = Arc::new(Mutex::new(Vec::new()));

    let first = Arc::clone(&log);
    let mw_first: CanonicalHandler = Arc::new(move |_ctx: &mut RequestContext| {
        first.lock().unwrap().push("first");
    });
    let second = Arc::clone(&log);
    let mw_second: CanonicalHandler = Arc::new(move |_ctx: &mut RequestContext| {
        second.lock().unwrap().push("second");
    });

    router.use_middleware(mw_first).use_middleware(mw_second);

    let seen = Arc::clone(&log);
    router.get("/traced", move |_ctx: &mut RequestContext| {
        seen.lock().unwrap().push("handler");
    });

    let _ = engine.dispatch(Method::GET, "/traced", HeaderVec::new(), None);
    assert_eq!(*log.lock().unwrap(), vec!["first", "second", "handler"]);
}

#[test]
fn test_middleware_short_circuit_skips_handler() {
    let _tracing = TestTracing::init();
    let engine = RecordingEngine::new();
    let mut router = Router::new(engine.clone());

    let guard: CanonicalHandler = Arc::new(|ctx: &mut RequestContext| {
        ctx.write_json(401, &json!({ "code": "401", "msg": "unauthorized" }));
    });

    let mut protected = router.group("/secure", vec![guard]);
    protected.get("/data", || -> &'static str { "secret" });

    let resp = engine
        .dispatch(Method::GET, "/secure/data", HeaderVec::new(), None)
        .unwrap();
    assert_eq!(resp.status, 401);
    assert_eq!(resp.body_json().unwrap()["msg"], "unauthorized");
}

#[test]
fn test_static_registrations_pass_through() {
    let _tracing = TestTracing::init();
    let engine = RecordingEngine::new();
    let mut router = Router::new(engine.clone());
    router.static_file("/favicon.ico", "assets/favicon.ico");

    let mut site = router.group("/site", Vec::new());
    site.static_dir("/assets", "public");

    assert_eq!(
        engine.statics(),
        vec![
            StaticEntry::File {
                route: "/favicon.ico".to_string(),
                path: PathBuf::from("assets/favicon.ico"),
            },
            StaticEntry::Dir {
                route: "/site/assets".to_string(),
                path: PathBuf::from("public"),
            },
        ]
    );
}
