//! # Pessoa Resource
//!
//! CRUD over person records at `/api/pessoa`. Every route accepts and
//! returns JSON or XML; see [`crate::extractors`].

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, MethodRouter};
use axum::Router;
use carteira_core::{Pessoa, PessoaFilter, PessoaInput, PessoaPatch, Validate};

use crate::error::AppError;
use crate::extractors::{path_id, Negotiated, Payload, ResponseFormat, Template};
use crate::middleware::operation_log::{log_operation, ResourceName};
use crate::state::AppState;

fn collection() -> MethodRouter<AppState> {
    get(read).post(create).put(update).delete(delete_by_entity)
}

/// Build the pessoa router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/pessoa", collection())
        .route("/api/pessoa/", collection())
        .route(
            "/api/pessoa/:id",
            get(read_by_id)
                .patch(update_part)
                .put(update_full)
                .delete(delete),
        )
        .route_layer(from_fn_with_state(
            ResourceName("PessoaResource"),
            log_operation,
        ))
}

/// POST /api/pessoa: Create a person.
#[utoipa::path(
    post,
    path = "/api/pessoa",
    request_body = PessoaInput,
    responses(
        (status = 201, description = "Pessoa created", body = Pessoa),
        (status = 400, description = "Malformed body", body = crate::error::ErrorBody),
        (status = 422, description = "Validation failed", body = crate::error::ErrorBody),
    ),
    tag = "pessoa"
)]
async fn create(
    State(state): State<AppState>,
    ResponseFormat(format): ResponseFormat,
    Payload(input): Payload<PessoaInput>,
) -> Result<Negotiated<Pessoa>, AppError> {
    input.validate()?;
    let created = state.pessoas.create(input).await?;
    Ok(Negotiated::one(format, StatusCode::CREATED, created))
}

/// GET /api/pessoa: List people matching a template.
///
/// The template is taken from the body when one is sent, otherwise from
/// the query string. No template lists everyone.
#[utoipa::path(
    get,
    path = "/api/pessoa",
    params(PessoaFilter),
    responses(
        (status = 200, description = "Matching people", body = [Pessoa]),
        (status = 404, description = "Nothing matched", body = crate::error::ErrorBody),
    ),
    tag = "pessoa"
)]
async fn read(
    State(state): State<AppState>,
    ResponseFormat(format): ResponseFormat,
    Template(filter): Template<PessoaFilter>,
) -> Result<Negotiated<Pessoa>, AppError> {
    let found = state.pessoas.read(&filter)?;
    Ok(Negotiated::many(format, found))
}

/// GET /api/pessoa/:id: Get a person by id.
#[utoipa::path(
    get,
    path = "/api/pessoa/{id}",
    params(("id" = i32, Path, description = "Pessoa ID")),
    responses(
        (status = 200, description = "Pessoa found", body = Pessoa),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "pessoa"
)]
async fn read_by_id(
    State(state): State<AppState>,
    ResponseFormat(format): ResponseFormat,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Negotiated<Pessoa>, AppError> {
    let id = path_id(id)?;
    let found = state.pessoas.read_by_id(id)?;
    Ok(Negotiated::one(format, StatusCode::OK, found))
}

/// PATCH /api/pessoa/:id: Update the fields present in the body.
#[utoipa::path(
    patch,
    path = "/api/pessoa/{id}",
    params(("id" = i32, Path, description = "Pessoa ID")),
    request_body = PessoaPatch,
    responses(
        (status = 200, description = "Pessoa updated", body = Pessoa),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 422, description = "Validation failed", body = crate::error::ErrorBody),
    ),
    tag = "pessoa"
)]
async fn update_part(
    State(state): State<AppState>,
    ResponseFormat(format): ResponseFormat,
    id: Result<Path<i32>, PathRejection>,
    Payload(patch): Payload<PessoaPatch>,
) -> Result<Negotiated<Pessoa>, AppError> {
    let id = path_id(id)?;
    patch.validate()?;
    let updated = state.pessoas.update_part(id, patch).await?;
    Ok(Negotiated::one(format, StatusCode::OK, updated))
}

/// PUT /api/pessoa/:id: Replace every field of a person.
#[utoipa::path(
    put,
    path = "/api/pessoa/{id}",
    params(("id" = i32, Path, description = "Pessoa ID")),
    request_body = PessoaInput,
    responses(
        (status = 200, description = "Pessoa replaced", body = Pessoa),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 422, description = "Validation failed", body = crate::error::ErrorBody),
    ),
    tag = "pessoa"
)]
async fn update_full(
    State(state): State<AppState>,
    ResponseFormat(format): ResponseFormat,
    id: Result<Path<i32>, PathRejection>,
    Payload(input): Payload<PessoaInput>,
) -> Result<Negotiated<Pessoa>, AppError> {
    let id = path_id(id)?;
    input.validate()?;
    let replaced = state.pessoas.update_full(id, input).await?;
    Ok(Negotiated::one(format, StatusCode::OK, replaced))
}

/// PUT /api/pessoa: Replace the person named by the body's `id`.
#[utoipa::path(
    put,
    path = "/api/pessoa",
    request_body = PessoaInput,
    responses(
        (status = 200, description = "Pessoa replaced", body = Pessoa),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 422, description = "Missing id or validation failed", body = crate::error::ErrorBody),
    ),
    tag = "pessoa"
)]
async fn update(
    State(state): State<AppState>,
    ResponseFormat(format): ResponseFormat,
    Payload(input): Payload<PessoaInput>,
) -> Result<Negotiated<Pessoa>, AppError> {
    input.validate()?;
    let replaced = state.pessoas.update(input).await?;
    Ok(Negotiated::one(format, StatusCode::OK, replaced))
}

/// DELETE /api/pessoa/:id: Delete a person by id.
#[utoipa::path(
    delete,
    path = "/api/pessoa/{id}",
    params(("id" = i32, Path, description = "Pessoa ID")),
    responses(
        (status = 204, description = "Pessoa deleted"),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "pessoa"
)]
async fn delete(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let id = path_id(id)?;
    state.pessoas.delete_by_id(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/pessoa: Delete every person matching a non-empty template.
#[utoipa::path(
    delete,
    path = "/api/pessoa",
    params(PessoaFilter),
    responses(
        (status = 204, description = "Matching people deleted"),
        (status = 404, description = "Nothing matched", body = crate::error::ErrorBody),
        (status = 422, description = "Empty template", body = crate::error::ErrorBody),
    ),
    tag = "pessoa"
)]
async fn delete_by_entity(
    State(state): State<AppState>,
    Template(filter): Template<PessoaFilter>,
) -> Result<StatusCode, AppError> {
    let removed = state.pessoas.delete(&filter).await?;
    tracing::debug!(removed, "deleted matching pessoas");
    Ok(StatusCode::NO_CONTENT)
}
