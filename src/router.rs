//! Registration facade over an external routing engine.
//!
//! The engine itself (route tree, middleware chaining, static file
//! mechanics) stays behind the [`EngineScope`] contract. This module only
//! adapts handlers on their way in and decides which [`Renderer`] each
//! scope uses.

use std::path::Path;
use std::sync::Arc;

use http::Method;
use tracing::debug;

use crate::adapter::{adapt, CanonicalHandler, HandlerShape};
use crate::render::{DefaultRenderer, Renderer};

/// The routing-engine contract this layer consumes.
///
/// A scope is one registration surface of the engine: the root, or a
/// prefixed sub-scope with its own middleware chain. Middleware and static
/// serving pass through untouched; this layer never reinterprets them.
pub trait EngineScope {
    /// Install a canonical handler under `method` + `path`.
    fn register(&mut self, method: Method, path: &str, handler: CanonicalHandler);

    /// Append a middleware to this scope's chain.
    fn apply(&mut self, middleware: CanonicalHandler);

    /// Create a sub-scope under `prefix` carrying extra middleware.
    fn subscope(&mut self, prefix: &str, middleware: Vec<CanonicalHandler>) -> Self
    where
        Self: Sized;

    /// Serve a single file under `route`.
    fn static_file(&mut self, route: &str, file: &Path);

    /// Serve a directory tree under `route`.
    fn static_dir(&mut self, route: &str, dir: &Path);
}

/// Signature-flexible registration facade.
///
/// Every verb method accepts any handler admitted by the shape grammar (see
/// [`HandlerShape`]); the handler is adapted once, here, and the canonical
/// closure installed into the engine. Each scope carries a [`Renderer`];
/// sub-scopes created with [`group`](Router::group) inherit it.
pub struct Router<S: EngineScope> {
    scope: S,
    renderer: Arc<dyn Renderer>,
}

impl<S: EngineScope> Router<S> {
    /// Wrap an engine scope with the default renderer.
    #[must_use]
    pub fn new(scope: S) -> Self {
        Self::with_renderer(scope, Arc::new(DefaultRenderer))
    }

    /// Wrap an engine scope with a custom renderer.
    #[must_use]
    pub fn with_renderer(scope: S, renderer: Arc<dyn Renderer>) -> Self {
        Self { scope, renderer }
    }

    /// Append a middleware to this scope, passed through to the engine.
    pub fn use_middleware(&mut self, middleware: CanonicalHandler) -> &mut Self {
        self.scope.apply(middleware);
        self
    }

    /// Create a sub-scope under `prefix`. The child inherits this scope's
    /// renderer; install a different one with [`Router::with_renderer`] on
    /// the returned value's scope if needed.
    pub fn group(&mut self, prefix: &str, middleware: Vec<CanonicalHandler>) -> Router<S> {
        Router {
            scope: self.scope.subscope(prefix, middleware),
            renderer: Arc::clone(&self.renderer),
        }
    }

    fn route<M, H>(&mut self, method: Method, path: &str, handler: H) -> &mut Self
    where
        H: HandlerShape<M>,
    {
        debug!(method = %method, path = %path, "handler registered");
        let canonical = adapt(handler, Arc::clone(&self.renderer));
        self.scope.register(method, path, canonical);
        self
    }

    pub fn get<M, H: HandlerShape<M>>(&mut self, path: &str, handler: H) -> &mut Self {
        self.route(Method::GET, path, handler)
    }

    pub fn post<M, H: HandlerShape<M>>(&mut self, path: &str, handler: H) -> &mut Self {
        self.route(Method::POST, path, handler)
    }

    pub fn put<M, H: HandlerShape<M>>(&mut self, path: &str, handler: H) -> &mut Self {
        self.route(Method::PUT, path, handler)
    }

    pub fn delete<M, H: HandlerShape<M>>(&mut self, path: &str, handler: H) -> &mut Self {
        self.route(Method::DELETE, path, handler)
    }

    pub fn patch<M, H: HandlerShape<M>>(&mut self, path: &str, handler: H) -> &mut Self {
        self.route(Method::PATCH, path, handler)
    }

    pub fn head<M, H: HandlerShape<M>>(&mut self, path: &str, handler: H) -> &mut Self {
        self.route(Method::HEAD, path, handler)
    }

    pub fn options<M, H: HandlerShape<M>>(&mut self, path: &str, handler: H) -> &mut Self {
        self.route(Method::OPTIONS, path, handler)
    }

    /// Register the handler under every verb this layer knows.
    pub fn any<M, H: HandlerShape<M>>(&mut self, path: &str, handler: H) -> &mut Self {
        let canonical = adapt(handler, Arc::clone(&self.renderer));
        for method in [
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::HEAD,
            Method::OPTIONS,
        ] {
            debug!(method = %method, path = %path, "handler registered");
            self.scope.register(method, path, Arc::clone(&canonical));
        }
        self
    }

    /// Serve a single file, passed through to the engine untouched.
    pub fn static_file(&mut self, route: &str, file: impl AsRef<Path>) -> &mut Self {
        self.scope.static_file(route, file.as_ref());
        self
    }

    /// Serve a directory tree, passed through to the engine untouched.
    pub fn static_dir(&mut self, route: &str, dir: impl AsRef<Path>) -> &mut Self {
        self.scope.static_dir(route, dir.as_ref());
        self
    }

    /// Hand the configured scope back to the engine.
    #[must_use]
    pub fn into_scope(self) -> S {
        self.scope
    }
}
