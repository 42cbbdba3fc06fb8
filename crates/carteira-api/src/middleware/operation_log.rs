//! # Operation Logging
//!
//! Every resource operation logs one INFO line naming the resource and
//! the operation (`PessoaResource.create`). The request path goes out at
//! DEBUG; decoded payloads are logged by the extractors inside the same
//! span, so they carry the resource and operation fields too.

use axum::extract::{MatchedPath, Request, State};
use axum::http::Method;
use axum::middleware::Next;
use axum::response::Response;
use tracing::Instrument;

/// Name of the resource a router serves, e.g. `PessoaResource`.
#[derive(Debug, Clone, Copy)]
pub struct ResourceName(pub &'static str);

/// Operation served by `method` on a collection route or, when
/// `addresses_id` is set, on a `/:id` route.
pub fn classify(method: &Method, addresses_id: bool) -> Option<&'static str> {
    let operation = match (method.as_str(), addresses_id) {
        ("POST", false) => "create",
        ("GET", false) => "read",
        ("PUT", false) => "update",
        ("DELETE", false) => "deleteByEntity",
        ("GET", true) => "readById",
        ("PATCH", true) => "updatePart",
        ("PUT", true) => "updateFull",
        ("DELETE", true) => "delete",
        _ => return None,
    };
    Some(operation)
}

/// Middleware that logs the operation and runs the handler inside an
/// `operation` span.
///
/// Must be installed with `route_layer` so that [`MatchedPath`] is set.
pub async fn log_operation(
    State(ResourceName(resource)): State<ResourceName>,
    request: Request,
    next: Next,
) -> Response {
    let addresses_id = request
        .extensions()
        .get::<MatchedPath>()
        .is_some_and(|p| p.as_str().ends_with("/:id"));

    let Some(operation) = classify(request.method(), addresses_id) else {
        return next.run(request).await;
    };

    tracing::info!("Executing {resource}.{operation}");
    tracing::debug!(path = %request.uri().path(), "Executing {resource}.{operation}");

    let span = tracing::info_span!("operation", resource, operation);
    next.run(request).instrument(span).await
}
