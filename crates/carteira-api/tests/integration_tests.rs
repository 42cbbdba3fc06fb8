//! # Integration Tests for carteira-api
//!
//! Drives the assembled router end to end: both resources, template
//! reads and deletes, JSON/XML negotiation, error mapping, health probes
//! and the OpenAPI document.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use carteira_api::state::{AppConfig, AppState};

/// Helper: build the test app, in-memory only.
fn test_app() -> axum::Router {
    carteira_api::app(AppState::new())
}

/// Helper: read response body as string.
async fn body_string(response: axum::http::Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: axum::http::Response<Body>) -> Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn send(app: &axum::Router, request: Request<Body>) -> axum::http::Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

/// Helper: create a record and return its assigned id.
async fn create(app: &axum::Router, resource: &str, body: Value) -> i64 {
    let response = send(app, json_request("POST", &format!("/api/{resource}"), body)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_i64().unwrap()
}

fn cdb(pessoa_id: i64) -> Value {
    json!({
        "descricao": "CDB Banco X",
        "valor": 250.0,
        "tipo": "CDB",
        "data_aplicacao": "2024-01-15",
        "pessoa_id": pessoa_id
    })
}

// -- Health Probes ------------------------------------------------------------

#[tokio::test]
async fn test_liveness_probe() {
    let response = send(&test_app(), empty_request("GET", "/health/liveness")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ok");
}

#[tokio::test]
async fn test_readiness_probe() {
    let response = send(&test_app(), empty_request("GET", "/health/readiness")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ready");
}

// -- Pessoa -------------------------------------------------------------------

#[tokio::test]
async fn test_create_pessoa_returns_201_with_id() {
    let app = test_app();
    let response = send(&app, json_request("POST", "/api/pessoa", json!({"nome": "Ana"}))).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert!(response.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("application/json"));
    let body = body_json(response).await;
    assert!(body["id"].is_i64());
    assert_eq!(body["nome"], "Ana");
}

#[tokio::test]
async fn test_create_assigns_distinct_ids() {
    let app = test_app();
    let mut ids = Vec::new();
    for nome in ["Ana", "Bia", "Caio", "Ana"] {
        ids.push(create(&app, "pessoa", json!({ "nome": nome })).await);
    }
    let mut unique = ids.clone();
    unique.sort_unstable();
    unique.dedup();
    assert_eq!(unique.len(), ids.len(), "ids repeated: {ids:?}");
}

#[tokio::test]
async fn test_read_by_id_returns_created_record() {
    let app = test_app();
    let payload = json!({
        "nome": "Ana",
        "email": "ana@example.com",
        "cpf": "123.456.789-09",
        "data_nascimento": "1990-05-17"
    });
    let response = send(&app, json_request("POST", "/api/pessoa", payload)).await;
    let created = body_json(response).await;
    let id = created["id"].as_i64().unwrap();

    let response = send(&app, empty_request("GET", &format!("/api/pessoa/{id}"))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, created);
}

#[tokio::test]
async fn test_read_by_id_missing_returns_404() {
    let response = send(&test_app(), empty_request("GET", "/api/pessoa/999")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_read_by_non_numeric_id_returns_400() {
    let response = send(&test_app(), empty_request("GET", "/api/pessoa/abc")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_with_blank_nome_returns_422() {
    let app = test_app();
    let response = send(&app, json_request("POST", "/api/pessoa", json!({"nome": "  "}))).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["details"]["field"], "nome");
}

#[tokio::test]
async fn test_create_without_nome_returns_422() {
    let app = test_app();
    let response = send(
        &app,
        json_request("POST", "/api/pessoa", json!({"email": "ana@example.com"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_create_with_malformed_json_returns_400() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/pessoa")
        .header("content-type", "application/json")
        .body(Body::from("{\"nome\":"))
        .unwrap();
    let response = send(&test_app(), request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_with_client_id_returns_422() {
    let app = test_app();
    let response = send(
        &app,
        json_request("POST", "/api/pessoa", json!({"id": 7, "nome": "Ana"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_create_with_invalid_email_returns_422() {
    let app = test_app();
    let response = send(
        &app,
        json_request("POST", "/api/pessoa", json!({"nome": "Ana", "email": "ana"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_update_part_leaves_absent_fields_unchanged() {
    let app = test_app();
    let id = create(
        &app,
        "pessoa",
        json!({"nome": "Ana", "email": "ana@example.com"}),
    )
    .await;

    let response = send(
        &app,
        json_request("PATCH", &format!("/api/pessoa/{id}"), json!({"nome": "Ana Maria"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["nome"], "Ana Maria");
    assert_eq!(body["email"], "ana@example.com");
}

#[tokio::test]
async fn test_update_part_with_mismatched_id_returns_422() {
    let app = test_app();
    let id = create(&app, "pessoa", json!({"nome": "Ana"})).await;
    let response = send(
        &app,
        json_request(
            "PATCH",
            &format!("/api/pessoa/{id}"),
            json!({"id": id + 1, "nome": "Bia"}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_update_full_replaces_every_field() {
    let app = test_app();
    let id = create(
        &app,
        "pessoa",
        json!({"nome": "Ana", "email": "ana@example.com"}),
    )
    .await;

    let response = send(
        &app,
        json_request("PUT", &format!("/api/pessoa/{id}"), json!({"nome": "Ana B"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"id": id, "nome": "Ana B"}));

    let response = send(&app, empty_request("GET", &format!("/api/pessoa/{id}"))).await;
    assert_eq!(body_json(response).await, json!({"id": id, "nome": "Ana B"}));
}

#[tokio::test]
async fn test_update_full_missing_returns_404() {
    let response = send(
        &test_app(),
        json_request("PUT", "/api/pessoa/41", json!({"nome": "Ana"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_by_body_id() {
    let app = test_app();
    let id = create(&app, "pessoa", json!({"nome": "Ana"})).await;

    let response = send(
        &app,
        json_request("PUT", "/api/pessoa", json!({"id": id, "nome": "Ana C"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["nome"], "Ana C");
}

#[tokio::test]
async fn test_update_without_body_id_returns_422() {
    let app = test_app();
    create(&app, "pessoa", json!({"nome": "Ana"})).await;
    let response = send(&app, json_request("PUT", "/api/pessoa", json!({"nome": "x"}))).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_delete_then_read_returns_404() {
    let app = test_app();
    let id = create(&app, "pessoa", json!({"nome": "Ana"})).await;

    let response = send(&app, empty_request("DELETE", &format!("/api/pessoa/{id}"))).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(body_string(response).await.is_empty());

    let response = send(&app, empty_request("GET", &format!("/api/pessoa/{id}"))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&app, empty_request("DELETE", &format!("/api/pessoa/{id}"))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_read_with_query_template() {
    let app = test_app();
    create(&app, "pessoa", json!({"nome": "Ana"})).await;
    create(&app, "pessoa", json!({"nome": "Bia"})).await;
    create(&app, "pessoa", json!({"nome": "Ana"})).await;

    let response = send(&app, empty_request("GET", "/api/pessoa?nome=Ana")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let found = body.as_array().unwrap();
    assert_eq!(found.len(), 2);
    assert!(found.iter().all(|p| p["nome"] == "Ana"));
}

#[tokio::test]
async fn test_read_with_body_template() {
    let app = test_app();
    create(&app, "pessoa", json!({"nome": "Ana"})).await;
    create(&app, "pessoa", json!({"nome": "Bia"})).await;

    let response = send(&app, json_request("GET", "/api/pessoa", json!({"nome": "Bia"}))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["nome"], "Bia");
}

#[tokio::test]
async fn test_read_without_template_lists_all_and_trailing_slash_routes() {
    let app = test_app();
    create(&app, "pessoa", json!({"nome": "Ana"})).await;
    create(&app, "pessoa", json!({"nome": "Bia"})).await;

    for uri in ["/api/pessoa", "/api/pessoa/"] {
        let response = send(&app, empty_request("GET", uri)).await;
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        assert_eq!(body_json(response).await.as_array().unwrap().len(), 2);
    }
}

#[tokio::test]
async fn test_read_without_match_returns_404() {
    let app = test_app();
    create(&app, "pessoa", json!({"nome": "Ana"})).await;
    let response = send(&app, empty_request("GET", "/api/pessoa?nome=Zoe")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_by_template_removes_exactly_matches() {
    let app = test_app();
    create(&app, "pessoa", json!({"nome": "Ana"})).await;
    let bia = create(&app, "pessoa", json!({"nome": "Bia"})).await;
    create(&app, "pessoa", json!({"nome": "Ana"})).await;

    let response = send(&app, json_request("DELETE", "/api/pessoa", json!({"nome": "Ana"}))).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(&app, empty_request("GET", "/api/pessoa")).await;
    let body = body_json(response).await;
    let left = body.as_array().unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0]["id"], bia);
}

#[tokio::test]
async fn test_delete_by_empty_template_returns_422() {
    let app = test_app();
    create(&app, "pessoa", json!({"nome": "Ana"})).await;

    let response = send(&app, empty_request("DELETE", "/api/pessoa")).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = send(&app, empty_request("GET", "/api/pessoa")).await;
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_delete_by_template_without_match_returns_404() {
    let app = test_app();
    create(&app, "pessoa", json!({"nome": "Ana"})).await;
    let response = send(&app, empty_request("DELETE", "/api/pessoa?nome=Zoe")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// -- Investimento -------------------------------------------------------------

#[tokio::test]
async fn test_patch_investimento_valor_keeps_other_fields() {
    let app = test_app();
    let owner = create(&app, "pessoa", json!({"nome": "Ana"})).await;
    let id = create(&app, "investimento", cdb(owner)).await;

    let response = send(
        &app,
        json_request("PATCH", &format!("/api/investimento/{id}"), json!({"valor": 1000})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, empty_request("GET", &format!("/api/investimento/{id}"))).await;
    let body = body_json(response).await;
    assert_eq!(body["valor"], 1000.0);
    assert_eq!(body["descricao"], "CDB Banco X");
    assert_eq!(body["tipo"], "CDB");
    assert_eq!(body["data_aplicacao"], "2024-01-15");
    assert_eq!(body["pessoa_id"], owner);
}

#[tokio::test]
async fn test_create_investimento_with_negative_valor_returns_422() {
    let app = test_app();
    let response = send(
        &app,
        json_request(
            "POST",
            "/api/investimento",
            json!({"descricao": "CDB", "valor": -5.0}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_investimento_owner_is_not_checked() {
    let app = test_app();
    let response = send(&app, json_request("POST", "/api/investimento", cdb(404))).await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_filter_investimentos_by_owner() {
    let app = test_app();
    create(&app, "investimento", cdb(1)).await;
    create(&app, "investimento", cdb(2)).await;
    create(&app, "investimento", cdb(1)).await;

    let response = send(&app, empty_request("GET", "/api/investimento?pessoa_id=1")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let response = send(&app, empty_request("DELETE", "/api/investimento?pessoa_id=1")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = send(&app, empty_request("GET", "/api/investimento")).await;
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["pessoa_id"], 2);
}

#[tokio::test]
async fn test_resources_keep_separate_id_sequences() {
    let app = test_app();
    let pessoa = create(&app, "pessoa", json!({"nome": "Ana"})).await;
    let investimento = create(&app, "investimento", cdb(pessoa)).await;
    assert_eq!(pessoa, 1);
    assert_eq!(investimento, 1);
}

// -- Content Negotiation ------------------------------------------------------

#[tokio::test]
async fn test_xml_create_and_read() {
    let app = test_app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/pessoa")
        .header("content-type", "application/xml")
        .header("accept", "application/xml")
        .body(Body::from(
            "<pessoa><nome>Ana</nome><email>ana@example.com</email></pessoa>",
        ))
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(response.headers()["content-type"], "application/xml");
    let body = body_string(response).await;
    assert!(body.starts_with("<pessoa>"), "{body}");
    assert!(body.contains("<id>1</id>"), "{body}");
    assert!(body.contains("<nome>Ana</nome>"), "{body}");

    let request = Request::builder()
        .uri("/api/pessoa")
        .header("accept", "text/xml")
        .body(Body::empty())
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.starts_with("<pessoas>"), "{body}");
    assert_eq!(body.matches("<item>").count(), 1, "{body}");
}

#[tokio::test]
async fn test_xml_request_json_response() {
    let app = test_app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/investimento")
        .header("content-type", "text/xml")
        .body(Body::from(
            "<investimento><descricao>Tesouro Selic</descricao><valor>100.5</valor></investimento>",
        ))
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["descricao"], "Tesouro Selic");
    assert_eq!(body["valor"], 100.5);
}

#[tokio::test]
async fn test_xml_unparsable_valor_returns_422() {
    let app = test_app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/investimento")
        .header("content-type", "application/xml")
        .body(Body::from(
            "<investimento><descricao>CDB</descricao><valor>abc</valor></investimento>",
        ))
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let request = Request::builder()
        .method("POST")
        .uri("/api/pessoa")
        .header("content-type", "application/xml")
        .body(Body::from("<pessoa><nome>A</nome><id>zz</id></pessoa>"))
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_xml_broken_markup_returns_400() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/pessoa")
        .header("content-type", "application/xml")
        .body(Body::from("<pessoa><nome>Ana</pessoa>"))
        .unwrap();
    let response = send(&test_app(), request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unsupported_content_type_returns_415() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/pessoa")
        .header("content-type", "text/plain")
        .body(Body::from("nome=Ana"))
        .unwrap();
    let response = send(&test_app(), request).await;
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn test_unacceptable_accept_returns_406() {
    let app = test_app();
    let id = create(&app, "pessoa", json!({"nome": "Ana"})).await;
    let request = Request::builder()
        .uri(format!("/api/pessoa/{id}"))
        .header("accept", "image/png")
        .body(Body::empty())
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "NOT_ACCEPTABLE");
}

#[tokio::test]
async fn test_errors_are_json_even_when_xml_is_requested() {
    let request = Request::builder()
        .uri("/api/pessoa/77")
        .header("accept", "application/xml")
        .body(Body::empty())
        .unwrap();
    let response = send(&test_app(), request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_body_over_limit_returns_413() {
    let config = AppConfig {
        body_limit: 64,
        ..AppConfig::default()
    };
    let app = carteira_api::app(AppState::with_config(config, None));
    let long_name = "a".repeat(200);
    let response = send(
        &app,
        json_request("POST", "/api/pessoa", json!({ "nome": long_name })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

// -- OpenAPI ------------------------------------------------------------------

#[tokio::test]
async fn test_openapi_spec_lists_resources() {
    let response = send(&test_app(), empty_request("GET", "/openapi.json")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let paths = body["paths"].as_object().unwrap();
    assert!(paths.contains_key("/api/pessoa"));
    assert!(paths.contains_key("/api/pessoa/{id}"));
    assert!(paths.contains_key("/api/investimento"));
    assert!(paths.contains_key("/api/investimento/{id}"));
}
