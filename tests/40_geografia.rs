mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use common::{admin, assert_error, get, request, send, tecnico};
use serde_json::json;

#[tokio::test]
async fn search_requires_a_term() -> Result<()> {
    for path in ["/api/geografia/buscar", "/api/geografia/buscar?q=", "/api/geografia/buscar?q=%20%20"] {
        let res = send(get(path, Some(tecnico().as_str()))).await?;
        assert_error(&res, StatusCode::BAD_REQUEST, "BAD_REQUEST");
    }
    Ok(())
}

#[tokio::test]
async fn mutations_backup_and_restore_are_admin_only() -> Result<()> {
    let token = tecnico();
    let cases = [
        (Method::POST, "/api/geografia/regiones", Some(json!({ "nombre": "Ñuble", "paisId": 1 }))),
        (Method::PUT, "/api/geografia/comunas/5", Some(json!({ "nombre": "Otra" }))),
        (Method::DELETE, "/api/geografia/paises/1", None),
        (Method::GET, "/api/geografia/backup", None),
        (Method::POST, "/api/geografia/restore", Some(json!({}))),
    ];

    for (method, path, body) in cases {
        let res = send(request(method.clone(), path, Some(token.as_str()), body)).await?;
        assert_eq!(res.status, StatusCode::FORBIDDEN, "{} {}", method, path);
    }
    Ok(())
}

#[tokio::test]
async fn new_comuna_needs_its_provincia() -> Result<()> {
    let res = send(request(
        Method::POST,
        "/api/geografia/comunas",
        Some(admin().as_str()),
        Some(json!({ "nombre": "Providencia" })),
    ))
    .await?;
    assert_error(&res, StatusCode::BAD_REQUEST, "VALIDATION_ERROR");
    assert_eq!(res.body["field_errors"]["provinciaId"], "es obligatorio");
    Ok(())
}

#[tokio::test]
async fn restore_rejects_malformed_snapshot() -> Result<()> {
    let res = send(request(
        Method::POST,
        "/api/geografia/restore",
        Some(admin().as_str()),
        Some(json!({ "version": 1, "paises": [] })),
    ))
    .await?;
    assert_error(&res, StatusCode::BAD_REQUEST, "INVALID_JSON");
    Ok(())
}

#[tokio::test]
async fn unknown_level_is_not_routed() -> Result<()> {
    let res = send(get("/api/geografia/ciudades", Some(tecnico().as_str()))).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    Ok(())
}
