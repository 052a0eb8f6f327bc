//! # flexroute
//!
//! **flexroute** is a signature-adaptation layer that sits between an HTTP
//! routing engine and user-supplied request handlers. Handlers are written
//! in whatever shape reads best (take the request context, take a bound
//! input struct, return a payload or a `Result`) and are normalized once,
//! at registration, into the single canonical shape the engine requires.
//!
//! ## Architecture
//!
//! - **[`adapter`]** - the shape grammar and call adaptation: binding,
//!   validation, invocation, output interpretation
//! - **[`render`]** - the four-case [`Outcome`] and the pluggable
//!   [`Renderer`] that puts it on the wire
//! - **[`context`]** - the per-request transport context: parsed request in,
//!   response slot out
//! - **[`router`]** - the registration facade and the [`EngineScope`]
//!   contract the external engine fulfils
//! - **[`ids`]** - ULID request identifiers for log correlation
//!
//! ### Request flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Engine as Routing Engine
//!     participant Canonical as Canonical Closure
//!     participant Bind as Bindable
//!     participant Handler as User Handler
//!     participant Renderer
//!
//!     Engine->>Canonical: call(RequestContext)
//!     Canonical->>Bind: Default + bind + validate
//!     alt bind or validation fails
//!         Canonical->>Renderer: BindFailure (400, warn)
//!     else bound
//!         Canonical->>Handler: call with declared arguments
//!         alt handler returned Err
//!             Canonical->>Renderer: Fault (500, error + path)
//!         else payload present
//!             Canonical->>Renderer: Payload (200, raw)
//!         else nothing written
//!             Canonical->>Renderer: NoContent (200, envelope)
//!         end
//!     end
//!     Renderer->>Engine: ResponseParts
//! ```
//!
//! ## Quick start
//!
//! ```no_run
//! use flexroute::{Bindable, Router};
//! use serde::Deserialize;
//! # use flexroute::{CanonicalHandler, EngineScope};
//! # use http::Method;
//! # use std::path::Path;
//! # struct NoopScope;
//! # impl EngineScope for NoopScope {
//! #     fn register(&mut self, _: Method, _: &str, _: CanonicalHandler) {}
//! #     fn apply(&mut self, _: CanonicalHandler) {}
//! #     fn subscope(&mut self, _: &str, _: Vec<CanonicalHandler>) -> Self { NoopScope }
//! #     fn static_file(&mut self, _: &str, _: &Path) {}
//! #     fn static_dir(&mut self, _: &str, _: &Path) {}
//! # }
//!
//! #[derive(Debug, Default, Deserialize)]
//! struct Greeting {
//!     name: String,
//! }
//!
//! impl Bindable for Greeting {}
//!
//! fn greet(who: Greeting) -> String {
//!     format!("Hi, {}!", who.name)
//! }
//!
//! let scope = NoopScope; // your engine's registration surface
//! let mut router = Router::new(scope);
//! router.any("/greeting", greet);
//! ```
//!
//! A request carrying `{"name": "Ada"}` answers `Hi, Ada!`; a request
//! missing the field answers the `{"code":"1","msg":…}` envelope with a 400
//! and never reaches `greet`.
//!
//! ## Concurrency
//!
//! The canonical closure captures only the handler and the renderer, both
//! immutable; bind targets are allocated fresh per request and owned by that
//! request alone. Registration happens once, serially, at startup.

pub mod adapter;
pub mod context;
pub mod ids;
pub mod render;
pub mod router;

pub use adapter::{adapt, Bindable, CanonicalHandler, HandlerShape, Json, Payload};
pub use context::{HeaderVec, ParamVec, RequestContext, ResponseParts};
pub use ids::RequestId;
pub use render::{DefaultRenderer, Outcome, Renderer};
pub use router::{EngineScope, Router};
