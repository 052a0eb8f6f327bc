use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::error;

use crate::context::RequestContext;
use crate::render::{Outcome, Renderer};

/// The canonical handler shape the routing engine consumes: one context
/// argument, no return value, safe for unlimited concurrent invocation.
pub type CanonicalHandler = Arc<dyn Fn(&mut RequestContext) + Send + Sync>;

/// A bind target: a struct the adapter fills from the request before the
/// handler runs.
///
/// A fresh `Default` instance is allocated per request and moved into the
/// handler once binding and validation succeed. Both provided methods are
/// capabilities in the sense that overriding them changes the adapter's
/// behavior for this type:
///
/// - [`bind`](Bindable::bind) replaces the context's default structural bind
///   entirely when overridden.
/// - [`validate`](Bindable::validate) runs after every successful bind,
///   whichever mechanism produced it.
///
/// Failures from either stage render as a bind failure (400-class) and the
/// handler body is never invoked.
pub trait Bindable: DeserializeOwned + Default + Send + 'static {
    /// Fill `self` from the request. The default performs the context's
    /// content-negotiated structural bind.
    fn bind(&mut self, ctx: &RequestContext) -> anyhow::Result<()> {
        *self = ctx.bind_into()?;
        Ok(())
    }

    /// Check the bound value. The default accepts everything.
    fn validate(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Wrapper rendering any `Serialize` value as a JSON payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Json<T>(pub T);

/// A value a handler may return in its payload slot.
///
/// `into_payload` distinguishes an *absent* payload (`None`, falls through
/// to the no-content check) from a *present* one (`Some`, rendered
/// unconditionally, empty or not). `Option::None` is absent; everything
/// else, including `""`, is present. `()` is deliberately not a payload:
/// a handler without a payload slot declares no return value, or
/// `Result<(), E>` for the error-only shapes.
pub trait Payload: Send + 'static {
    fn into_payload(self) -> Option<Value>;
}

impl Payload for String {
    fn into_payload(self) -> Option<Value> {
        Some(Value::String(self))
    }
}

impl Payload for &'static str {
    fn into_payload(self) -> Option<Value> {
        Some(Value::String(self.to_string()))
    }
}

impl Payload for Value {
    fn into_payload(self) -> Option<Value> {
        Some(self)
    }
}

macro_rules! scalar_payload {
    ($($ty:ty),*) => {
        $(impl Payload for $ty {
            fn into_payload(self) -> Option<Value> {
                Some(Value::from(self))
            }
        })*
    };
}

scalar_payload!(bool, i32, i64, u32, u64, f64);

impl<T: Serialize + Send + 'static> Payload for Json<T> {
    fn into_payload(self) -> Option<Value> {
        match serde_json::to_value(self.0) {
            Ok(value) => Some(value),
            Err(err) => {
                error!(error = %err, "failed to serialize response payload");
                Some(json!({ "error": "failed to serialize response" }))
            }
        }
    }
}

impl<P: Payload> Payload for Option<P> {
    fn into_payload(self) -> Option<Value> {
        self.and_then(Payload::into_payload)
    }
}

/// Marker types naming each admissible handler shape.
///
/// These only disambiguate the blanket [`HandlerShape`] implementations;
/// user code never names them, the compiler infers the right one from the
/// handler's signature.
pub mod shape {
    pub struct CtxOnly;
    pub struct CtxPayload;
    pub struct CtxFallible;
    pub struct CtxErrOnly;
    pub struct CtxBind;
    pub struct CtxBindPayload;
    pub struct CtxBindFallible;
    pub struct CtxBindErrOnly;
    pub struct BindPayload;
    pub struct BindFallible;
    pub struct BindErrOnly;
    pub struct NullaryPayload;
    pub struct NullaryFallible;
    pub struct NullaryErrOnly;
}

/// A handler admissible under the shape grammar.
///
/// Implemented for every function shape the adapter accepts; `M` is a
/// marker the compiler infers. Shapes outside the grammar have no
/// implementation and fail to compile at the registration site.
pub trait HandlerShape<M>: Send + Sync + Sized + 'static {
    /// Build the canonical closure for this handler.
    fn adapt(self, renderer: Arc<dyn Renderer>) -> CanonicalHandler;
}

/// Normalize `handler` into the canonical shape, rendering through
/// `renderer`.
pub fn adapt<M, H>(handler: H, renderer: Arc<dyn Renderer>) -> CanonicalHandler
where
    H: HandlerShape<M>,
{
    handler.adapt(renderer)
}

/// Allocate, bind, and validate a fresh bind target.
fn bind_target<T: Bindable>(ctx: &RequestContext) -> anyhow::Result<T> {
    let mut target = T::default();
    target.bind(ctx)?;
    target.validate()?;
    Ok(target)
}

/// Render a present payload, or fall through to the no-content check.
fn render_payload(ctx: &mut RequestContext, renderer: &dyn Renderer, payload: Option<Value>) {
    match payload {
        Some(value) => renderer.render(ctx, Outcome::Payload(value)),
        None if !ctx.written() => renderer.render(ctx, Outcome::NoContent),
        None => {}
    }
}

/// Interpret a fallible handler's return: the error slot wins, the payload
/// slot is discarded on error.
fn render_result<P, E>(ctx: &mut RequestContext, renderer: &dyn Renderer, result: Result<P, E>)
where
    P: Payload,
    E: Into<anyhow::Error>,
{
    match result {
        Ok(payload) => render_payload(ctx, renderer, payload.into_payload()),
        Err(err) => renderer.render(ctx, Outcome::Fault(err.into())),
    }
}

/// Interpret an error-only handler's return: no payload slot exists, so a
/// success falls through to the no-content check.
fn render_unit_result<E>(ctx: &mut RequestContext, renderer: &dyn Renderer, result: Result<(), E>)
where
    E: Into<anyhow::Error>,
{
    match result {
        Ok(()) => {
            if !ctx.written() {
                renderer.render(ctx, Outcome::NoContent);
            }
        }
        Err(err) => renderer.render(ctx, Outcome::Fault(err.into())),
    }
}

// Already canonical: no shape inference, no binding. The handler writes its
// own response; only the no-content fallback is added so a silent handler
// still answers.
impl<F> HandlerShape<shape::CtxOnly> for F
where
    F: Fn(&mut RequestContext) + Send + Sync + 'static,
{
    fn adapt(self, renderer: Arc<dyn Renderer>) -> CanonicalHandler {
        Arc::new(move |ctx| {
            (self)(ctx);
            if !ctx.written() {
                renderer.render(ctx, Outcome::NoContent);
            }
        })
    }
}

impl<F, P> HandlerShape<(shape::CtxPayload, P)> for F
where
    F: Fn(&mut RequestContext) -> P + Send + Sync + 'static,
    P: Payload,
{
    fn adapt(self, renderer: Arc<dyn Renderer>) -> CanonicalHandler {
        Arc::new(move |ctx| {
            let payload = (self)(ctx).into_payload();
            render_payload(ctx, renderer.as_ref(), payload);
        })
    }
}

impl<F, P, E> HandlerShape<(shape::CtxFallible, P, E)> for F
where
    F: Fn(&mut RequestContext) -> Result<P, E> + Send + Sync + 'static,
    P: Payload,
    E: Into<anyhow::Error> + 'static,
{
    fn adapt(self, renderer: Arc<dyn Renderer>) -> CanonicalHandler {
        Arc::new(move |ctx| {
            let result = (self)(ctx);
            render_result(ctx, renderer.as_ref(), result);
        })
    }
}

impl<F, E> HandlerShape<(shape::CtxErrOnly, E)> for F
where
    F: Fn(&mut RequestContext) -> Result<(), E> + Send + Sync + 'static,
    E: Into<anyhow::Error> + 'static,
{
    fn adapt(self, renderer: Arc<dyn Renderer>) -> CanonicalHandler {
        Arc::new(move |ctx| {
            let result = (self)(ctx);
            render_unit_result(ctx, renderer.as_ref(), result);
        })
    }
}

impl<F, T> HandlerShape<(shape::CtxBind, T)> for F
where
    F: Fn(&mut RequestContext, T) + Send + Sync + 'static,
    T: Bindable,
{
    fn adapt(self, renderer: Arc<dyn Renderer>) -> CanonicalHandler {
        Arc::new(move |ctx| {
            let target = match bind_target::<T>(ctx) {
                Ok(target) => target,
                Err(err) => return renderer.render(ctx, Outcome::BindFailure(err)),
            };
            (self)(ctx, target);
            if !ctx.written() {
                renderer.render(ctx, Outcome::NoContent);
            }
        })
    }
}

impl<F, T, P> HandlerShape<(shape::CtxBindPayload, T, P)> for F
where
    F: Fn(&mut RequestContext, T) -> P + Send + Sync + 'static,
    T: Bindable,
    P: Payload,
{
    fn adapt(self, renderer: Arc<dyn Renderer>) -> CanonicalHandler {
        Arc::new(move |ctx| {
            let target = match bind_target::<T>(ctx) {
                Ok(target) => target,
                Err(err) => return renderer.render(ctx, Outcome::BindFailure(err)),
            };
            let payload = (self)(ctx, target).into_payload();
            render_payload(ctx, renderer.as_ref(), payload);
        })
    }
}

impl<F, T, P, E> HandlerShape<(shape::CtxBindFallible, T, P, E)> for F
where
    F: Fn(&mut RequestContext, T) -> Result<P, E> + Send + Sync + 'static,
    T: Bindable,
    P: Payload,
    E: Into<anyhow::Error> + 'static,
{
    fn adapt(self, renderer: Arc<dyn Renderer>) -> CanonicalHandler {
        Arc::new(move |ctx| {
            let target = match bind_target::<T>(ctx) {
                Ok(target) => target,
                Err(err) => return renderer.render(ctx, Outcome::BindFailure(err)),
            };
            let result = (self)(ctx, target);
            render_result(ctx, renderer.as_ref(), result);
        })
    }
}

impl<F, T, E> HandlerShape<(shape::CtxBindErrOnly, T, E)> for F
where
    F: Fn(&mut RequestContext, T) -> Result<(), E> + Send + Sync + 'static,
    T: Bindable,
    E: Into<anyhow::Error> + 'static,
{
    fn adapt(self, renderer: Arc<dyn Renderer>) -> CanonicalHandler {
        Arc::new(move |ctx| {
            let target = match bind_target::<T>(ctx) {
                Ok(target) => target,
                Err(err) => return renderer.render(ctx, Outcome::BindFailure(err)),
            };
            let result = (self)(ctx, target);
            render_unit_result(ctx, renderer.as_ref(), result);
        })
    }
}

impl<F, T, P> HandlerShape<(shape::BindPayload, T, P)> for F
where
    F: Fn(T) -> P + Send + Sync + 'static,
    T: Bindable,
    P: Payload,
{
    fn adapt(self, renderer: Arc<dyn Renderer>) -> CanonicalHandler {
        Arc::new(move |ctx| {
            let target = match bind_target::<T>(ctx) {
                Ok(target) => target,
                Err(err) => return renderer.render(ctx, Outcome::BindFailure(err)),
            };
            let payload = (self)(target).into_payload();
            render_payload(ctx, renderer.as_ref(), payload);
        })
    }
}

impl<F, T, P, E> HandlerShape<(shape::BindFallible, T, P, E)> for F
where
    F: Fn(T) -> Result<P, E> + Send + Sync + 'static,
    T: Bindable,
    P: Payload,
    E: Into<anyhow::Error> + 'static,
{
    fn adapt(self, renderer: Arc<dyn Renderer>) -> CanonicalHandler {
        Arc::new(move |ctx| {
            let target = match bind_target::<T>(ctx) {
                Ok(target) => target,
                Err(err) => return renderer.render(ctx, Outcome::BindFailure(err)),
            };
            let result = (self)(target);
            render_result(ctx, renderer.as_ref(), result);
        })
    }
}

impl<F, T, E> HandlerShape<(shape::BindErrOnly, T, E)> for F
where
    F: Fn(T) -> Result<(), E> + Send + Sync + 'static,
    T: Bindable,
    E: Into<anyhow::Error> + 'static,
{
    fn adapt(self, renderer: Arc<dyn Renderer>) -> CanonicalHandler {
        Arc::new(move |ctx| {
            let target = match bind_target::<T>(ctx) {
                Ok(target) => target,
                Err(err) => return renderer.render(ctx, Outcome::BindFailure(err)),
            };
            let result = (self)(target);
            render_unit_result(ctx, renderer.as_ref(), result);
        })
    }
}

impl<F, P> HandlerShape<(shape::NullaryPayload, P)> for F
where
    F: Fn() -> P + Send + Sync + 'static,
    P: Payload,
{
    fn adapt(self, renderer: Arc<dyn Renderer>) -> CanonicalHandler {
        Arc::new(move |ctx| {
            let payload = (self)().into_payload();
            render_payload(ctx, renderer.as_ref(), payload);
        })
    }
}

impl<F, P, E> HandlerShape<(shape::NullaryFallible, P, E)> for F
where
    F: Fn() -> Result<P, E> + Send + Sync + 'static,
    P: Payload,
    E: Into<anyhow::Error> + 'static,
{
    fn adapt(self, renderer: Arc<dyn Renderer>) -> CanonicalHandler {
        Arc::new(move |ctx| {
            let result = (self)();
            render_result(ctx, renderer.as_ref(), result);
        })
    }
}

impl<F, E> HandlerShape<(shape::NullaryErrOnly, E)> for F
where
    F: Fn() -> Result<(), E> + Send + Sync + 'static,
    E: Into<anyhow::Error> + 'static,
{
    fn adapt(self, renderer: Arc<dyn Renderer>) -> CanonicalHandler {
        Arc::new(move |ctx| {
            let result = (self)();
            render_unit_result(ctx, renderer.as_ref(), result);
        })
    }
}
