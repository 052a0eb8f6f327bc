//! Shared test utilities: an in-memory engine fulfilling the scope
//! contract, request helpers, and tracing capture.
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use flexroute::{CanonicalHandler, EngineScope, HeaderVec, RequestContext, ResponseParts};
use http::Method;
use tracing_subscriber::EnvFilter;

/// Capture tracing output for the duration of a test.
pub struct TestTracing {
    _guard: tracing::subscriber::DefaultGuard,
}

impl TestTracing {
    pub fn init() -> Self {
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .finish();
        Self {
            _guard: tracing::subscriber::set_default(subscriber),
        }
    }
}

pub fn header_vec(pairs: &[(&str, &str)]) -> HeaderVec {
    pairs
        .iter()
        .map(|(k, v)| (Arc::from(*k), v.to_string()))
        .collect()
}

pub fn json_headers() -> HeaderVec {
    header_vec(&[("content-type", "application/json")])
}

pub fn form_headers() -> HeaderVec {
    header_vec(&[("content-type", "application/x-www-form-urlencoded")])
}

struct RegisteredRoute {
    method: Method,
    path: String,
    middleware: Vec<CanonicalHandler>,
    handler: CanonicalHandler,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StaticEntry {
    File { route: String, path: PathBuf },
    Dir { route: String, path: PathBuf },
}

/// In-memory routing engine: records registrations and replays requests by
/// exact method + path match. Route patterns and middleware chaining beyond
/// "run in order, stop once written" are deliberately out of scope here.
#[derive(Clone)]
pub struct RecordingEngine {
    routes: Arc<Mutex<Vec<RegisteredRoute>>>,
    statics: Arc<Mutex<Vec<StaticEntry>>>,
    prefix: String,
    middleware: Vec<CanonicalHandler>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self {
            routes: Arc::new(Mutex::new(Vec::new())),
            statics: Arc::new(Mutex::new(Vec::new())),
            prefix: String::new(),
            middleware: Vec::new(),
        }
    }

    fn join(&self, path: &str) -> String {
        format!("{}{}", self.prefix, path)
    }

    pub fn route_count(&self) -> usize {
        self.routes.lock().unwrap().len()
    }

    pub fn registered(&self) -> Vec<(Method, String)> {
        self.routes
            .lock()
            .unwrap()
            .iter()
            .map(|r| (r.method.clone(), r.path.clone()))
            .collect()
    }

    pub fn statics(&self) -> Vec<StaticEntry> {
        self.statics.lock().unwrap().clone()
    }

    /// Drive one request through middleware and handler, returning whatever
    /// response was written.
    pub fn dispatch(
        &self,
        method: Method,
        target: &str,
        headers: HeaderVec,
        body: Option<&[u8]>,
    ) -> Option<ResponseParts> {
        let path = target.split('?').next().unwrap_or("/");
        let (middleware, handler) = {
            let routes = self.routes.lock().unwrap();
            let route = routes
                .iter()
                .find(|r| r.method == method && r.path == path)?;
            (route.middleware.clone(), Arc::clone(&route.handler))
        };

        let mut ctx = RequestContext::new(method, target, headers, body);
        for mw in &middleware {
            (**mw)(&mut ctx);
            if ctx.written() {
                break;
            }
        }
        if !ctx.written() {
            (*handler)(&mut ctx);
        }
        ctx.take_response()
    }
}

impl EngineScope for RecordingEngine {
    fn register(&mut self, method: Method, path: &str, handler: CanonicalHandler) {
        self.routes.lock().unwrap().push(RegisteredRoute {
            method,
            path: self.join(path),
            middleware: self.middleware.clone(),
            handler,
        });
    }

    fn apply(&mut self, middleware: CanonicalHandler) {
        self.middleware.push(middleware);
    }

    fn subscope(&mut self, prefix: &str, middleware: Vec<CanonicalHandler>) -> Self {
        let mut chain = self.middleware.clone();
        chain.extend(middleware);
        Self {
            routes: Arc::clone(&self.routes),
            statics: Arc::clone(&self.statics),
            prefix: self.join(prefix),
            middleware: chain,
        }
    }

    fn static_file(&mut self, route: &str, file: &std::path::Path) {
        self.statics.lock().unwrap().push(StaticEntry::File {
            route: self.join(route),
            path: file.to_path_buf(),
        });
    }

    fn static_dir(&mut self, route: &str, dir: &std::path::Path) {
        self.statics.lock().unwrap().push(StaticEntry::Dir {
            route: self.join(route),
            path: dir.to_path_buf(),
        });
    }
}
