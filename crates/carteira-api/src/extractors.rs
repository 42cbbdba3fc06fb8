//! # Custom Extractors & Content Negotiation
//!
//! Every resource speaks JSON and XML. This module owns the choice between
//! them in both directions:
//!
//! - [`Payload`] decodes a request body according to `Content-Type`.
//! - [`Template`] reads an equality template from the body when one is
//!   sent, otherwise from the query string.
//! - [`ResponseFormat`] picks the response encoding from `Accept`.
//! - [`Negotiated`] encodes one record or a collection in that format.
//!
//! Decoding failures are mapped to [`AppError`]: a syntactically broken
//! body is `BadRequest`, a well-formed body with a missing or mistyped
//! field is `Validation`.

use axum::async_trait;
use axum::body::Bytes;
use axum::extract::rejection::{BytesRejection, PathRejection};
use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::header::{ACCEPT, CONTENT_TYPE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use carteira_core::Entity;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::AppError;

/// Wire format of a request or response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Xml,
}

impl Format {
    /// Format of the request body. An absent `Content-Type` means JSON.
    pub fn from_content_type(headers: &HeaderMap) -> Result<Self, AppError> {
        let Some(value) = headers.get(CONTENT_TYPE) else {
            return Ok(Self::Json);
        };
        let raw = value.to_str().unwrap_or_default();
        Self::classify(&essence(raw)).ok_or_else(|| {
            AppError::UnsupportedMediaType(format!(
                "\"{raw}\", expected application/json or application/xml"
            ))
        })
    }

    /// Format of the response body.
    ///
    /// The first media range in `Accept` that names a served format wins;
    /// wildcards resolve to JSON. Quality weights are not ranked. An
    /// absent header means JSON.
    pub fn from_accept(headers: &HeaderMap) -> Result<Self, AppError> {
        let Some(value) = headers.get(ACCEPT) else {
            return Ok(Self::Json);
        };
        let raw = value.to_str().unwrap_or_default();
        for range in raw.split(',') {
            let range = essence(range);
            match range.as_str() {
                "*/*" | "application/*" => return Ok(Self::Json),
                "text/*" => return Ok(Self::Xml),
                other => {
                    if let Some(format) = Self::classify(other) {
                        return Ok(format);
                    }
                }
            }
        }
        Err(AppError::NotAcceptable(format!(
            "\"{raw}\", available: application/json, application/xml"
        )))
    }

    fn classify(essence: &str) -> Option<Self> {
        match essence {
            "application/json" => Some(Self::Json),
            "application/xml" | "text/xml" => Some(Self::Xml),
            e if e.ends_with("+json") => Some(Self::Json),
            e if e.ends_with("+xml") => Some(Self::Xml),
            _ => None,
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Xml => "application/xml",
        }
    }

    /// Decode a body in this format.
    pub fn decode<T: DeserializeOwned>(self, bytes: &[u8]) -> Result<T, AppError> {
        match self {
            Self::Json => serde_json::from_slice(bytes).map_err(|e| {
                if e.is_data() {
                    AppError::validation(e.to_string())
                } else {
                    AppError::BadRequest(format!("malformed JSON body: {e}"))
                }
            }),
            Self::Xml => {
                let text = std::str::from_utf8(bytes)
                    .map_err(|e| AppError::BadRequest(format!("XML body is not UTF-8: {e}")))?;
                quick_xml::de::from_str(text).map_err(xml_rejection)
            }
        }
    }
}

/// Well-formed XML whose content does not fit the target type is a
/// validation failure. Broken markup stays a bad request.
fn xml_rejection(err: quick_xml::DeError) -> AppError {
    use quick_xml::DeError;
    match err {
        DeError::Custom(msg) => AppError::validation(msg),
        DeError::InvalidInt(_) | DeError::InvalidFloat(_) | DeError::InvalidBoolean(_) => {
            AppError::validation(err.to_string())
        }
        other => AppError::BadRequest(format!("malformed XML body: {other}")),
    }
}

/// Media type without parameters, lowercased.
fn essence(media_type: &str) -> String {
    media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn body_rejection(err: BytesRejection) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::BadRequest(err.body_text())
    }
}

/// Map a path rejection (e.g. a non-numeric id) to [`AppError::BadRequest`].
pub fn path_id(result: Result<Path<i32>, PathRejection>) -> Result<i32, AppError> {
    result
        .map(|Path(id)| id)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

// -- Request extractors -------------------------------------------------------

/// A request body decoded as JSON or XML according to `Content-Type`.
#[derive(Debug)]
pub struct Payload<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for Payload<T>
where
    S: Send + Sync,
    T: DeserializeOwned + std::fmt::Debug + Send,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let format = Format::from_content_type(req.headers())?;
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(body_rejection)?;
        if bytes.is_empty() {
            return Err(AppError::BadRequest("request body is empty".to_string()));
        }
        let value: T = format.decode(&bytes)?;
        tracing::debug!(payload = ?value, "decoded request payload");
        Ok(Self(value))
    }
}

/// An equality template, read from the body when one is sent and from the
/// query string otherwise.
#[derive(Debug)]
pub struct Template<F>(pub F);

#[async_trait]
impl<S, F> FromRequest<S> for Template<F>
where
    S: Send + Sync,
    F: DeserializeOwned + std::fmt::Debug + Send,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let uri = req.uri().clone();
        let format = Format::from_content_type(req.headers());
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(body_rejection)?;

        let template: F = if bytes.iter().all(u8::is_ascii_whitespace) {
            Query::try_from_uri(&uri)
                .map(|Query(f)| f)
                .map_err(|err| AppError::BadRequest(err.body_text()))?
        } else {
            format?.decode(&bytes)?
        };
        tracing::debug!(template = ?template, "decoded request template");
        Ok(Self(template))
    }
}

/// The response format chosen from the `Accept` header.
#[derive(Debug, Clone, Copy)]
pub struct ResponseFormat(pub Format);

#[async_trait]
impl<S> FromRequestParts<S> for ResponseFormat
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Format::from_accept(&parts.headers).map(Self)
    }
}

// -- Responses ----------------------------------------------------------------

#[derive(Debug)]
enum Body<E> {
    One(E),
    Many(Vec<E>),
}

/// A record or a collection encoded in the negotiated format.
///
/// XML documents are rooted at the entity name for a single record and at
/// the collection name for a list, with one `<item>` element per record.
#[derive(Debug)]
pub struct Negotiated<E> {
    format: Format,
    status: StatusCode,
    body: Body<E>,
}

impl<E: Entity> Negotiated<E> {
    pub fn one(format: Format, status: StatusCode, record: E) -> Self {
        Self {
            format,
            status,
            body: Body::One(record),
        }
    }

    pub fn many(format: Format, records: Vec<E>) -> Self {
        Self {
            format,
            status: StatusCode::OK,
            body: Body::Many(records),
        }
    }
}

#[derive(Serialize)]
struct XmlItems<'a, E> {
    item: &'a [E],
}

fn to_xml<E: Entity>(body: &Body<E>) -> Result<String, quick_xml::DeError> {
    match body {
        Body::One(record) => quick_xml::se::to_string_with_root(E::NAME, record),
        Body::Many(records) => {
            quick_xml::se::to_string_with_root(E::COLLECTION, &XmlItems { item: records })
        }
    }
}

impl<E: Entity> IntoResponse for Negotiated<E> {
    fn into_response(self) -> Response {
        match self.format {
            Format::Json => match self.body {
                Body::One(record) => (self.status, Json(record)).into_response(),
                Body::Many(records) => (self.status, Json(records)).into_response(),
            },
            Format::Xml => match to_xml(&self.body) {
                Ok(document) => (
                    self.status,
                    [(
                        CONTENT_TYPE,
                        HeaderValue::from_static(Format::Xml.content_type()),
                    )],
                    document,
                )
                    .into_response(),
                Err(e) => {
                    AppError::Internal(format!("XML encoding of {} failed: {e}", E::NAME))
                        .into_response()
                }
            },
        }
    }
}
