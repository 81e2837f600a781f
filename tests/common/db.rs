//! Helpers for tests that need a live, disposable Postgres database.
//!
//! Set `TEST_DATABASE_URL` to run them; without it every database test
//! returns early. The restore test empties the geography tables, so never
//! point this at a database holding real data.

use accesspoint_control::api::empresas::CreateEmpresa;
use accesspoint_control::api::usuarios::CreateUsuario;
use accesspoint_control::database::empresas::insert_empresa;
use accesspoint_control::database::models::Empresa;
use accesspoint_control::database::usuarios::insert_usuario;
use accesspoint_control::middleware::SessionUser;
use accesspoint_control::types::Rol;
use accesspoint_control::validation::validate_rut;
use anyhow::{Context, Result};
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

pub const TEST_DATABASE_URL: &str = "TEST_DATABASE_URL";

/// Fresh pool on the test database with migrations applied, or None to skip
pub async fn pool() -> Result<Option<PgPool>> {
    dotenvy::dotenv().ok();
    let Ok(url) = std::env::var(TEST_DATABASE_URL) else {
        eprintln!("{} not set; skipping database test", TEST_DATABASE_URL);
        return Ok(None);
    };

    let pool = PgPoolOptions::new()
        .max_connections(4)
        .connect(&url)
        .await
        .with_context(|| format!("connecting to {}", TEST_DATABASE_URL))?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(Some(pool))
}

/// Short unique suffix so parallel tests and reruns never collide on unique columns
pub fn unique() -> String {
    Uuid::new_v4().simple().to_string()[..12].to_string()
}

/// A valid RUT nobody else has used
pub fn rut_unico() -> String {
    let body = 10_000_000 + (Uuid::new_v4().as_u128() % 89_999_999) as u64;
    "0123456789K"
        .chars()
        .map(|dv| format!("{}-{}", body, dv))
        .find(|rut| validate_rut(rut))
        .expect("every body has a check digit")
}

/// Provision a user and return it as an authenticated session
pub async fn usuario(pool: &PgPool, rol: Rol) -> Result<SessionUser> {
    let input = CreateUsuario {
        email: format!("test-{}@accesspoint.cl", unique()),
        nombre: format!("Usuario {}", rol),
        rol: Some(rol),
    };
    let usuario = insert_usuario(pool, &input).await?;
    Ok(SessionUser {
        id: usuario.id,
        email: usuario.email,
        name: usuario.nombre,
        role: usuario.rol,
    })
}

pub async fn empresa(pool: &PgPool) -> Result<Empresa> {
    let input = CreateEmpresa {
        nombre: format!("Empresa {}", unique()),
        rut: rut_unico(),
        giro: Some("Telecomunicaciones".to_string()),
        telefono: None,
        correo: None,
        direccion_id: None,
    };
    Ok(insert_empresa(pool, &input).await?)
}

pub async fn count(pool: &PgPool, sql: &str, value: &str) -> Result<i64> {
    let (n,): (i64,) = sqlx::query_as(sql).bind(value).fetch_one(pool).await?;
    Ok(n)
}
