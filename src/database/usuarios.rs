use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::{Usuario, UsuarioResumen};
use crate::api::usuarios::{CreateUsuario, UpdateUsuario};
use crate::types::Rol;

/// Emails are stored and compared lower-cased
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub async fn find_active_by_email(pool: &PgPool, email: &str) -> Result<Option<Usuario>, DatabaseError> {
    let row = sqlx::query_as::<_, Usuario>("SELECT * FROM usuarios WHERE email = $1 AND activo")
        .bind(normalize_email(email))
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn list_activos(pool: &PgPool) -> Result<Vec<Usuario>, DatabaseError> {
    let rows = sqlx::query_as::<_, Usuario>("SELECT * FROM usuarios WHERE activo ORDER BY nombre")
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn usuario_resumen<'e, E: PgExecutor<'e>>(executor: E, id: Uuid) -> Result<UsuarioResumen, DatabaseError> {
    sqlx::query_as::<_, UsuarioResumen>("SELECT id, email, nombre FROM usuarios WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Usuario", id))
}

pub async fn insert_usuario(pool: &PgPool, input: &CreateUsuario) -> Result<Usuario, DatabaseError> {
    let row = sqlx::query_as::<_, Usuario>(
        "INSERT INTO usuarios (id, email, nombre, rol) VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(normalize_email(&input.email))
    .bind(input.nombre.trim())
    .bind(input.rol.unwrap_or(Rol::Tecnico))
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn update_usuario(pool: &PgPool, id: Uuid, input: &UpdateUsuario) -> Result<Usuario, DatabaseError> {
    sqlx::query_as::<_, Usuario>(
        r#"
        UPDATE usuarios SET
            nombre     = COALESCE($2, nombre),
            rol        = COALESCE($3, rol),
            activo     = COALESCE($4, activo),
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(input.nombre.as_deref().map(str::trim))
    .bind(input.rol)
    .bind(input.activo)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::not_found("Usuario", id))
}

/// Look up by email regardless of the active flag
pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Usuario>, DatabaseError> {
    let row = sqlx::query_as::<_, Usuario>("SELECT * FROM usuarios WHERE email = $1")
        .bind(normalize_email(email))
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_are_lower_cased() {
        assert_eq!(normalize_email("  Tecnico@AccessPoint.CL "), "tecnico@accesspoint.cl");
    }
}
