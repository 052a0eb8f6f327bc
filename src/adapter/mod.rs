//! # Handler Adapter
//!
//! The adapter normalizes handlers written in any admissible signature into
//! the one canonical shape the routing engine understands:
//! `Fn(&mut RequestContext)`.
//!
//! ## Shape grammar
//!
//! A handler takes zero or more of a context parameter and a bind-target
//! parameter, and returns either a payload, a `Result` of payload and error,
//! or nothing at all (context-only). The full set:
//!
//! ```text
//! Fn(&mut RequestContext)                          // already canonical
//! Fn(&mut RequestContext) -> P
//! Fn(&mut RequestContext) -> Result<P, E>
//! Fn(&mut RequestContext) -> Result<(), E>
//! Fn(&mut RequestContext, T)
//! Fn(&mut RequestContext, T) -> P
//! Fn(&mut RequestContext, T) -> Result<P, E>
//! Fn(&mut RequestContext, T) -> Result<(), E>
//! Fn(T) -> P
//! Fn(T) -> Result<P, E>
//! Fn(T) -> Result<(), E>
//! Fn() -> P
//! Fn() -> Result<P, E>
//! Fn() -> Result<(), E>
//! ```
//!
//! with `T: Bindable`, `P: Payload` and `E: Into<anyhow::Error>`. Anything
//! else (a third parameter, a bind target that isn't [`Bindable`], a
//! handler with neither context nor outputs) has no [`HandlerShape`]
//! implementation and is rejected at compile time, before any request can
//! be served.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use flexroute::{adapt, Bindable, DefaultRenderer, RequestContext};
//! use serde::Deserialize;
//!
//! #[derive(Debug, Default, Deserialize)]
//! struct Greeting {
//!     name: String,
//! }
//!
//! impl Bindable for Greeting {}
//!
//! fn greet(_ctx: &mut RequestContext, who: Greeting) -> String {
//!     format!("Hi, {}!", who.name)
//! }
//!
//! let canonical = adapt(greet, Arc::new(DefaultRenderer));
//! ```
//!
//! The produced closure binds the request into a fresh `Greeting`, calls the
//! handler, and renders whatever came back. Binding can be replaced per type
//! by overriding [`Bindable::bind`], and validated by overriding
//! [`Bindable::validate`]; both are resolved at registration, never
//! re-checked per request.

mod core;

pub use core::*;
