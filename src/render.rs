//! Outcome rendering.
//!
//! Every request handled through the adapter ends in exactly one [`Outcome`],
//! consumed exactly once by a [`Renderer`]. The default renderer writes the
//! `{code, msg}` envelope; scopes may install their own via
//! [`Router::with_renderer`](crate::router::Router::with_renderer).

use serde_json::{json, Value};
use tracing::{error, warn};

use crate::context::RequestContext;

/// The tagged result of one request's handling.
#[derive(Debug)]
pub enum Outcome {
    /// Nothing to send: the handler returned no payload and wrote nothing.
    NoContent,
    /// The request data could not be bound or validated. The client's fault.
    BindFailure(anyhow::Error),
    /// The handler failed while processing an acceptable request. The
    /// server's fault.
    Fault(anyhow::Error),
    /// A payload the handler produced, rendered as the response body.
    Payload(Value),
}

/// Converts an [`Outcome`] into a wire response on the context.
pub trait Renderer: Send + Sync {
    fn render(&self, ctx: &mut RequestContext, outcome: Outcome);
}

/// The stock renderer.
///
/// Success and failure envelopes carry a `code` and a `msg` field:
///
/// | outcome       | status | body                              |
/// |---------------|--------|-----------------------------------|
/// | `NoContent`   | 200    | `{"code":"0","msg":"success"}`    |
/// | `BindFailure` | 400    | `{"code":"1","msg":<error text>}` |
/// | `Fault`       | 500    | `{"code":"500","msg":<error text>}` |
/// | `Payload`     | 200    | the value itself, no envelope     |
///
/// String payloads are written raw as `text/plain`, everything else as JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultRenderer;

impl Renderer for DefaultRenderer {
    fn render(&self, ctx: &mut RequestContext, outcome: Outcome) {
        match outcome {
            Outcome::NoContent => {
                ctx.write_json(200, &json!({ "code": "0", "msg": "success" }));
            }
            Outcome::BindFailure(err) => {
                warn!(
                    request_id = %ctx.request_id,
                    error = %err,
                    "failed to bind request parameters"
                );
                ctx.write_json(400, &json!({ "code": "1", "msg": err.to_string() }));
            }
            Outcome::Fault(err) => {
                error!(
                    request_id = %ctx.request_id,
                    path = %ctx.path,
                    error = %err,
                    "handler failed"
                );
                ctx.write_json(500, &json!({ "code": "500", "msg": err.to_string() }));
            }
            Outcome::Payload(value) => ctx.write_payload(200, value),
        }
    }
}
