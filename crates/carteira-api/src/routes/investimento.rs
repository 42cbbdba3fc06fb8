//! # Investimento Resource
//!
//! CRUD over investment records at `/api/investimento`, same shape as the
//! pessoa resource. `pessoa_id` is stored as given: the owner is never
//! looked up, and deleting a person leaves its investments in place.

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, MethodRouter};
use axum::Router;
use carteira_core::{Investimento, InvestimentoFilter, InvestimentoInput, InvestimentoPatch, Validate};

use crate::error::AppError;
use crate::extractors::{path_id, Negotiated, Payload, ResponseFormat, Template};
use crate::middleware::operation_log::{log_operation, ResourceName};
use crate::state::AppState;

fn collection() -> MethodRouter<AppState> {
    get(read).post(create).put(update).delete(delete_by_entity)
}

/// Build the investimento router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/investimento", collection())
        .route("/api/investimento/", collection())
        .route(
            "/api/investimento/:id",
            get(read_by_id)
                .patch(update_part)
                .put(update_full)
                .delete(delete),
        )
        .route_layer(from_fn_with_state(
            ResourceName("InvestimentoResource"),
            log_operation,
        ))
}

/// POST /api/investimento: Create an investment.
#[utoipa::path(
    post,
    path = "/api/investimento",
    request_body = InvestimentoInput,
    responses(
        (status = 201, description = "Investimento created", body = Investimento),
        (status = 400, description = "Malformed body", body = crate::error::ErrorBody),
        (status = 422, description = "Validation failed", body = crate::error::ErrorBody),
    ),
    tag = "investimento"
)]
async fn create(
    State(state): State<AppState>,
    ResponseFormat(format): ResponseFormat,
    Payload(input): Payload<InvestimentoInput>,
) -> Result<Negotiated<Investimento>, AppError> {
    input.validate()?;
    let created = state.investimentos.create(input).await?;
    Ok(Negotiated::one(format, StatusCode::CREATED, created))
}

/// GET /api/investimento: List investments matching a template.
#[utoipa::path(
    get,
    path = "/api/investimento",
    params(InvestimentoFilter),
    responses(
        (status = 200, description = "Matching investments", body = [Investimento]),
        (status = 404, description = "Nothing matched", body = crate::error::ErrorBody),
    ),
    tag = "investimento"
)]
async fn read(
    State(state): State<AppState>,
    ResponseFormat(format): ResponseFormat,
    Template(filter): Template<InvestimentoFilter>,
) -> Result<Negotiated<Investimento>, AppError> {
    let found = state.investimentos.read(&filter)?;
    Ok(Negotiated::many(format, found))
}

/// GET /api/investimento/:id: Get an investment by id.
#[utoipa::path(
    get,
    path = "/api/investimento/{id}",
    params(("id" = i32, Path, description = "Investimento ID")),
    responses(
        (status = 200, description = "Investimento found", body = Investimento),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "investimento"
)]
async fn read_by_id(
    State(state): State<AppState>,
    ResponseFormat(format): ResponseFormat,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Negotiated<Investimento>, AppError> {
    let id = path_id(id)?;
    let found = state.investimentos.read_by_id(id)?;
    Ok(Negotiated::one(format, StatusCode::OK, found))
}

#[utoipa::path(
    patch,
    path = "/api/investimento/{id}",
    params(("id" = i32, Path, description = "Investimento ID")),
    request_body = InvestimentoPatch,
    responses(
        (status = 200, description = "Investimento updated", body = Investimento),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 422, description = "Validation failed", body = crate::error::ErrorBody),
    ),
    tag = "investimento"
)]
async fn update_part(
    State(state): State<AppState>,
    ResponseFormat(format): ResponseFormat,
    id: Result<Path<i32>, PathRejection>,
    Payload(patch): Payload<InvestimentoPatch>,
) -> Result<Negotiated<Investimento>, AppError> {
    let id = path_id(id)?;
    patch.validate()?;
    let updated = state.investimentos.update_part(id, patch).await?;
    Ok(Negotiated::one(format, StatusCode::OK, updated))
}

/// PUT /api/investimento/:id: Replace every field of an investment.
#[utoipa::path(
    put,
    path = "/api/investimento/{id}",
    params(("id" = i32, Path, description = "Investimento ID")),
    request_body = InvestimentoInput,
    responses(
        (status = 200, description = "Investimento replaced", body = Investimento),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 422, description = "Validation failed", body = crate::error::ErrorBody),
    ),
    tag = "investimento"
)]
async fn update_full(
    State(state): State<AppState>,
    ResponseFormat(format): ResponseFormat,
    id: Result<Path<i32>, PathRejection>,
    Payload(input): Payload<InvestimentoInput>,
) -> Result<Negotiated<Investimento>, AppError> {
    let id = path_id(id)?;
    input.validate()?;
    let replaced = state.investimentos.update_full(id, input).await?;
    Ok(Negotiated::one(format, StatusCode::OK, replaced))
}

/// PUT /api/investimento: Replace the investment named by the body's `id`.
#[utoipa::path(
    put,
    path = "/api/investimento",
    request_body = InvestimentoInput,
    responses(
        (status = 200, description = "Investimento replaced", body = Investimento),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 422, description = "Missing id or validation failed", body = crate::error::ErrorBody),
    ),
    tag = "investimento"
)]
async fn update(
    State(state): State<AppState>,
    ResponseFormat(format): ResponseFormat,
    Payload(input): Payload<InvestimentoInput>,
) -> Result<Negotiated<Investimento>, AppError> {
    input.validate()?;
    let replaced = state.investimentos.update(input).await?;
    Ok(Negotiated::one(format, StatusCode::OK, replaced))
}

/// DELETE /api/investimento/:id: Delete an investment by id.
#[utoipa::path(
    delete,
    path = "/api/investimento/{id}",
    params(("id" = i32, Path, description = "Investimento ID")),
    responses(
        (status = 204, description = "Investimento deleted"),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "investimento"
)]
async fn delete(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let id = path_id(id)?;
    state.investimentos.delete_by_id(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/investimento: Delete every investment matching a non-empty template,
/// e.g. `?pessoa_id=3` to drop one owner's portfolio.
#[utoipa::path(
    delete,
    path = "/api/investimento",
    params(InvestimentoFilter),
    responses(
        (status = 204, description = "Matching investments deleted"),
        (status = 404, description = "Nothing matched", body = crate::error::ErrorBody),
        (status = 422, description = "Empty template", body = crate::error::ErrorBody),
    ),
    tag = "investimento"
)]
async fn delete_by_entity(
    State(state): State<AppState>,
    Template(filter): Template<InvestimentoFilter>,
) -> Result<StatusCode, AppError> {
    let removed = state.investimentos.delete(&filter).await?;
    tracing::debug!(removed, "deleted matching investimentos");
    Ok(StatusCode::NO_CONTENT)
}
