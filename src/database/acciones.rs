use chrono::{DateTime, Utc};
use sqlx::PgExecutor;
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::AccionTicket;
use crate::types::TipoAccion;

const SELECT_ACCION: &str = r#"
    SELECT a.id, a.ticket_id, a.usuario_id, u.nombre AS usuario_nombre,
           a.descripcion, a.tipo, a.fecha
    FROM acciones_ticket a
    JOIN usuarios u ON u.id = a.usuario_id
"#;

/// Oldest first
pub async fn list_acciones<'e, E: PgExecutor<'e>>(
    executor: E,
    ticket_id: i32,
) -> Result<Vec<AccionTicket>, DatabaseError> {
    let sql = format!("{} WHERE a.ticket_id = $1 ORDER BY a.fecha, a.id", SELECT_ACCION);
    let rows = sqlx::query_as::<_, AccionTicket>(&sql)
        .bind(ticket_id)
        .fetch_all(executor)
        .await?;
    Ok(rows)
}

/// An action, only if it belongs to `ticket_id`
pub async fn get_accion<'e, E: PgExecutor<'e>>(
    executor: E,
    ticket_id: i32,
    accion_id: i32,
) -> Result<AccionTicket, DatabaseError> {
    let sql = format!("{} WHERE a.id = $1 AND a.ticket_id = $2", SELECT_ACCION);
    sqlx::query_as::<_, AccionTicket>(&sql)
        .bind(accion_id)
        .bind(ticket_id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Acción", accion_id))
}

pub async fn insert_accion<'e, E: PgExecutor<'e>>(
    executor: E,
    ticket_id: i32,
    usuario_id: Uuid,
    descripcion: &str,
    tipo: TipoAccion,
    fecha: Option<DateTime<Utc>>,
) -> Result<AccionTicket, DatabaseError> {
    let row = sqlx::query_as::<_, AccionTicket>(
        r#"
        WITH inserted AS (
            INSERT INTO acciones_ticket (ticket_id, usuario_id, descripcion, tipo, fecha)
            VALUES ($1, $2, $3, $4, COALESCE($5, now()))
            RETURNING *
        )
        SELECT i.id, i.ticket_id, i.usuario_id, u.nombre AS usuario_nombre,
               i.descripcion, i.tipo, i.fecha
        FROM inserted i
        JOIN usuarios u ON u.id = i.usuario_id
        "#,
    )
    .bind(ticket_id)
    .bind(usuario_id)
    .bind(descripcion.trim())
    .bind(tipo)
    .bind(fecha)
    .fetch_one(executor)
    .await?;
    Ok(row)
}

pub async fn update_accion<'e, E: PgExecutor<'e>>(
    executor: E,
    accion_id: i32,
    descripcion: Option<&str>,
    tipo: Option<TipoAccion>,
) -> Result<AccionTicket, DatabaseError> {
    sqlx::query_as::<_, AccionTicket>(
        r#"
        WITH updated AS (
            UPDATE acciones_ticket SET
                descripcion = COALESCE($2, descripcion),
                tipo        = COALESCE($3, tipo)
            WHERE id = $1
            RETURNING *
        )
        SELECT d.id, d.ticket_id, d.usuario_id, u.nombre AS usuario_nombre,
               d.descripcion, d.tipo, d.fecha
        FROM updated d
        JOIN usuarios u ON u.id = d.usuario_id
        "#,
    )
    .bind(accion_id)
    .bind(descripcion.map(str::trim))
    .bind(tipo)
    .fetch_optional(executor)
    .await?
    .ok_or_else(|| DatabaseError::not_found("Acción", accion_id))
}

pub async fn delete_accion<'e, E: PgExecutor<'e>>(executor: E, accion_id: i32) -> Result<(), DatabaseError> {
    let result = sqlx::query("DELETE FROM acciones_ticket WHERE id = $1")
        .bind(accion_id)
        .execute(executor)
        .await?;
    if result.rows_affected() == 0 {
        return Err(DatabaseError::not_found("Acción", accion_id));
    }
    Ok(())
}
