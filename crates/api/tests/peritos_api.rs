//! HTTP-level integration tests for the peritos endpoints.
//!
//! Covers roster CRUD, the derived casosAsignados counter, listing filters,
//! and the soft delete (baja).

mod common;

use axum::http::StatusCode;
use common::{body_json, delete_auth, get, get_auth, post_json_auth, put_json_auth};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn perito_body(matricula: &str) -> serde_json::Value {
    serde_json::json!({
        "nombre": "Laura",
        "apellido": "Giménez",
        "matricula": matricula,
        "especialidades": ["caligrafía", "documentología"],
        "telefono": "+54 11 5555-0001",
        "email": "laura@peritos.test"
    })
}

fn oficio_body(expediente: &str, perito_id: i64) -> serde_json::Value {
    serde_json::json!({
        "numeroExpediente": expediente,
        "solicitanteNombre": "Marta",
        "solicitanteApellido": "Suárez",
        "solicitanteDni": "28111222",
        "tipoPeritaje": "caligráfico",
        "fechaVencimiento": "2030-06-01T12:00:00Z",
        "peritoId": perito_id
    })
}

/// Create a perito through the API and return its id.
async fn create_perito(pool: &PgPool, token: &str, matricula: &str) -> i64 {
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, "/peritos", token, perito_body(matricula)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    json["data"]["id"].as_i64().unwrap()
}

// ---------------------------------------------------------------------------
// Auth gate
// ---------------------------------------------------------------------------

/// Every /peritos endpoint requires a Bearer token.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_endpoints_require_auth(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/peritos").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

/// Registration returns 201 with the stored row and defaults applied.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_perito_returns_201(pool: PgPool) {
    let (_user, token) = common::seed_user(&pool, "tester").await;

    let app = common::build_test_app(pool);
    let response = post_json_auth(app, "/peritos", &token, perito_body("MAT-100")).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Perito registrado correctamente");
    assert_eq!(json["data"]["matricula"], "MAT-100");
    assert_eq!(json["data"]["activo"], true);
    assert_eq!(json["data"]["disponible"], true);
    assert_eq!(json["data"]["especialidades"][0], "caligrafía");
}

/// A duplicate matrícula is rejected with a Spanish message.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_duplicate_matricula_returns_400(pool: PgPool) {
    let (_user, token) = common::seed_user(&pool, "tester").await;
    create_perito(&pool, &token, "MAT-DUP").await;

    let app = common::build_test_app(pool);
    let response = post_json_auth(app, "/peritos", &token, perito_body("MAT-DUP")).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Ya existe un perito con esa matrícula");
}

/// A perito without especialidades is rejected.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_empty_especialidades_returns_400(pool: PgPool) {
    let (_user, token) = common::seed_user(&pool, "tester").await;

    let mut body = perito_body("MAT-101");
    body["especialidades"] = serde_json::json!([]);

    let app = common::build_test_app(pool);
    let response = post_json_auth(app, "/peritos", &token, body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Debe indicar al menos una especialidad");
}

// ---------------------------------------------------------------------------
// Listing and derived workload
// ---------------------------------------------------------------------------

/// casosAsignados counts open oficios, never a stored column.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_list_includes_casos_asignados(pool: PgPool) {
    let (_user, token) = common::seed_user(&pool, "tester").await;
    let perito_id = create_perito(&pool, &token, "MAT-200").await;

    for expediente in ["EXP-200-1", "EXP-200-2"] {
        let app = common::build_test_app(pool.clone());
        let response =
            post_json_auth(app, "/oficios", &token, oficio_body(expediente, perito_id)).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/peritos", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let row = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["id"] == perito_id)
        .expect("created perito should be listed");
    assert_eq!(row["casosAsignados"], 2);
}

/// ?activos=true hides peritos given de baja.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_list_filters_activos(pool: PgPool) {
    let (_user, token) = common::seed_user(&pool, "tester").await;
    let activo = create_perito(&pool, &token, "MAT-300").await;
    let baja = create_perito(&pool, &token, "MAT-301").await;

    let app = common::build_test_app(pool.clone());
    let response = delete_auth(app, &format!("/peritos/{baja}"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/peritos?activos=true", &token).await;
    let json = body_json(response).await;
    let ids: Vec<i64> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect();
    assert!(ids.contains(&activo));
    assert!(!ids.contains(&baja));

    // Without the filter both rows are visible.
    let app = common::build_test_app(pool);
    let response = get_auth(app, "/peritos", &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
}

// ---------------------------------------------------------------------------
// Get / update / delete
// ---------------------------------------------------------------------------

/// GET by id returns the perito with its workload.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_get_by_id_includes_casos_asignados(pool: PgPool) {
    let (_user, token) = common::seed_user(&pool, "tester").await;
    let perito_id = create_perito(&pool, &token, "MAT-400").await;

    let app = common::build_test_app(pool);
    let response = get_auth(app, &format!("/peritos/{perito_id}"), &token).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["nombre"], "Laura");
    assert_eq!(json["data"]["casosAsignados"], 0);
}

/// Unknown id returns 404 with the Spanish not-found message.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_get_nonexistent_returns_404(pool: PgPool) {
    let (_user, token) = common::seed_user(&pool, "tester").await;

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/peritos/999999", &token).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Perito con id 999999 no encontrado");
}

/// Partial update changes only the supplied fields.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_update_perito(pool: PgPool) {
    let (_user, token) = common::seed_user(&pool, "tester").await;
    let perito_id = create_perito(&pool, &token, "MAT-500").await;

    let app = common::build_test_app(pool);
    let response = put_json_auth(
        app,
        &format!("/peritos/{perito_id}"),
        &token,
        serde_json::json!({ "telefono": "+54 11 5555-9999", "disponible": false }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Perito actualizado correctamente");
    assert_eq!(json["data"]["telefono"], "+54 11 5555-9999");
    assert_eq!(json["data"]["disponible"], false);
    assert_eq!(json["data"]["nombre"], "Laura", "unrelated fields untouched");
}

/// DELETE is a baja: the row survives with activo = false.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_soft_delete_keeps_row(pool: PgPool) {
    let (_user, token) = common::seed_user(&pool, "tester").await;
    let perito_id = create_perito(&pool, &token, "MAT-600").await;

    let app = common::build_test_app(pool.clone());
    let response = delete_auth(app, &format!("/peritos/{perito_id}"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Perito dado de baja correctamente");

    let app = common::build_test_app(pool);
    let response = get_auth(app, &format!("/peritos/{perito_id}"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["activo"], false);
}

/// Deleting an unknown id returns 404.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_delete_nonexistent_returns_404(pool: PgPool) {
    let (_user, token) = common::seed_user(&pool, "tester").await;

    let app = common::build_test_app(pool);
    let response = delete_auth(app, "/peritos/424242", &token).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
