//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI spec,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Carteira API",
        version = "0.1.0",
        description = "CRUD over people (pessoa) and their investments (investimento). Every operation accepts and returns application/json or application/xml.",
        license(name = "MIT")
    ),
    paths(
        // Pessoa
        crate::routes::pessoa::create,
        crate::routes::pessoa::read,
        crate::routes::pessoa::read_by_id,
        crate::routes::pessoa::update_part,
        crate::routes::pessoa::update_full,
        crate::routes::pessoa::update,
        crate::routes::pessoa::delete,
        crate::routes::pessoa::delete_by_entity,
        // Investimento
        crate::routes::investimento::create,
        crate::routes::investimento::read,
        crate::routes::investimento::read_by_id,
        crate::routes::investimento::update_part,
        crate::routes::investimento::update_full,
        crate::routes::investimento::update,
        crate::routes::investimento::delete,
        crate::routes::investimento::delete_by_entity,
    ),
    components(schemas(
        carteira_core::Pessoa,
        carteira_core::PessoaInput,
        carteira_core::PessoaPatch,
        carteira_core::PessoaFilter,
        carteira_core::Investimento,
        carteira_core::InvestimentoInput,
        carteira_core::InvestimentoPatch,
        carteira_core::InvestimentoFilter,
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "pessoa", description = "Pessoa resource: people who hold investments"),
        (name = "investimento", description = "Investimento resource: investments, optionally owned by a pessoa"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json: Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
