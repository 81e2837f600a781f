mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use common::{admin, assert_error, request, send, tecnico};
use serde_json::json;

#[tokio::test]
async fn only_admins_provision_users() -> Result<()> {
    let body = json!({ "email": "nuevo@accesspoint.cl", "nombre": "Nuevo" });
    let res = send(request(Method::POST, "/api/usuarios", Some(tecnico().as_str()), Some(body))).await?;
    assert_error(&res, StatusCode::FORBIDDEN, "FORBIDDEN");

    let res = send(request(
        Method::PUT,
        "/api/usuarios/7b4d2f1e-8c1a-4c55-9a3e-2f0a6c1d9e10",
        Some(tecnico().as_str()),
        Some(json!({ "rol": "ADMIN" })),
    ))
    .await?;
    assert_error(&res, StatusCode::FORBIDDEN, "FORBIDDEN");
    Ok(())
}

#[tokio::test]
async fn user_email_is_validated() -> Result<()> {
    let body = json!({ "email": "sin-arroba", "nombre": "" });
    let res = send(request(Method::POST, "/api/usuarios", Some(admin().as_str()), Some(body))).await?;
    assert_error(&res, StatusCode::BAD_REQUEST, "VALIDATION_ERROR");
    assert!(res.body["field_errors"]["email"].is_string());
    assert!(res.body["field_errors"]["nombre"].is_string());
    Ok(())
}

#[tokio::test]
async fn user_id_must_be_a_uuid() -> Result<()> {
    let res = send(request(
        Method::PUT,
        "/api/usuarios/42",
        Some(admin().as_str()),
        Some(json!({ "activo": false })),
    ))
    .await?;
    assert_error(&res, StatusCode::BAD_REQUEST, "BAD_REQUEST");
    Ok(())
}
