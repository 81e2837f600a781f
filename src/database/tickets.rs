use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgExecutor, PgPool, Postgres, QueryBuilder};

use super::acciones::list_acciones;
use super::empresas::{empresa_resumen, get_contacto, get_sucursal, get_ubicacion};
use super::manager::DatabaseError;
use super::models::{Ticket, TicketDetalle, TicketResumen};
use super::usuarios::usuario_resumen;
use crate::api::tickets::{CreateTicket, TicketFilter, UpdateTicket, NUMERO_CASO_PREFIX};
use crate::types::{EstadoTicket, PrioridadTicket};
use uuid::Uuid;

/// Case number for a sequence value: 123 -> `TCK-000123`
pub fn format_numero_caso(seq: i64) -> String {
    format!("{}{:06}", NUMERO_CASO_PREFIX, seq)
}

pub async fn next_numero_caso<'e, E: PgExecutor<'e>>(executor: E) -> Result<String, DatabaseError> {
    let (seq,): (i64,) = sqlx::query_as("SELECT nextval('tickets_numero_caso_seq')")
        .fetch_one(executor)
        .await?;
    Ok(format_numero_caso(seq))
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &TicketFilter) {
    builder.push(" WHERE TRUE");
    if let Some(estado) = filter.estado {
        builder.push(" AND t.estado = ").push_bind(estado);
    }
    if let Some(prioridad) = filter.prioridad {
        builder.push(" AND t.prioridad = ").push_bind(prioridad);
    }
    if let Some(empresa_id) = filter.empresa_id {
        builder.push(" AND t.empresa_id = ").push_bind(empresa_id);
    }
    if let Some(tecnico_id) = filter.tecnico_id {
        builder.push(" AND t.tecnico_id = ").push_bind(tecnico_id);
    }
    if let Some(pattern) = filter.search_pattern() {
        builder
            .push(" AND (t.numero_caso ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR t.titulo ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

/// One page of tickets, newest first, plus the total matching the filter
pub async fn list_tickets(
    pool: &PgPool,
    filter: &TicketFilter,
    limit: i64,
) -> Result<(Vec<TicketResumen>, i64), DatabaseError> {
    let offset = filter.offset(limit);

    let mut select = QueryBuilder::<Postgres>::new(
        r#"
        SELECT t.id, t.numero_caso, t.titulo, t.estado, t.prioridad,
               t.empresa_id, e.nombre AS empresa_nombre,
               t.tecnico_id, u.nombre AS tecnico_nombre,
               t.fecha_cierre, t.created_at, t.updated_at
        FROM tickets t
        JOIN empresas e ON e.id = t.empresa_id
        LEFT JOIN usuarios u ON u.id = t.tecnico_id
        "#,
    );
    push_filter(&mut select, filter);
    select
        .push(" ORDER BY t.created_at DESC, t.id DESC LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);

    let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM tickets t");
    push_filter(&mut count, filter);

    let (items, (total,)) = futures::try_join!(
        select.build_query_as::<TicketResumen>().fetch_all(pool),
        count.build_query_as::<(i64,)>().fetch_one(pool),
    )?;
    Ok((items, total))
}

pub async fn get_ticket<'e, E: PgExecutor<'e>>(executor: E, id: i32) -> Result<Ticket, DatabaseError> {
    sqlx::query_as::<_, Ticket>("SELECT * FROM tickets WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Ticket", id))
}

/// Row lock for read-modify-write inside a transaction
pub async fn lock_ticket(conn: &mut PgConnection, id: i32) -> Result<Ticket, DatabaseError> {
    sqlx::query_as::<_, Ticket>("SELECT * FROM tickets WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Ticket", id))
}

/// Ticket with every relation loaded
pub async fn ticket_detalle(pool: &PgPool, id: i32) -> Result<TicketDetalle, DatabaseError> {
    let ticket = get_ticket(pool, id).await?;

    let (empresa, sucursal, ubicacion, contacto, tecnico, creado_por, acciones) = futures::try_join!(
        empresa_resumen(pool, ticket.empresa_id),
        async {
            match ticket.sucursal_id {
                Some(sid) => get_sucursal(pool, sid).await.map(Some),
                None => Ok(None),
            }
        },
        async {
            match ticket.ubicacion_id {
                Some(uid) => get_ubicacion(pool, uid).await.map(Some),
                None => Ok(None),
            }
        },
        async {
            match ticket.contacto_id {
                Some(cid) => get_contacto(pool, cid).await.map(Some),
                None => Ok(None),
            }
        },
        async {
            match ticket.tecnico_id {
                Some(tid) => usuario_resumen(pool, tid).await.map(Some),
                None => Ok(None),
            }
        },
        usuario_resumen(pool, ticket.creado_por_id),
        list_acciones(pool, id),
    )?;

    Ok(TicketDetalle {
        ticket,
        empresa,
        sucursal,
        ubicacion,
        contacto,
        tecnico,
        creado_por,
        acciones,
    })
}

pub async fn insert_ticket(
    conn: &mut PgConnection,
    input: &CreateTicket,
    numero_caso: &str,
    creado_por_id: Uuid,
) -> Result<Ticket, DatabaseError> {
    let estado = input.estado.unwrap_or(EstadoTicket::Abierto);
    let fecha_cierre: Option<DateTime<Utc>> = estado.is_closed().then(Utc::now);

    let row = sqlx::query_as::<_, Ticket>(
        r#"
        INSERT INTO tickets (
            numero_caso, titulo, descripcion, estado, prioridad,
            empresa_id, sucursal_id, ubicacion_id, contacto_id,
            tecnico_id, creado_por_id, fecha_cierre
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING *
        "#,
    )
    .bind(numero_caso)
    .bind(input.titulo.trim())
    .bind(input.descripcion.trim())
    .bind(estado)
    .bind(input.prioridad.unwrap_or(PrioridadTicket::Media))
    .bind(input.empresa_id)
    .bind(input.sucursal_id)
    .bind(input.ubicacion_id)
    .bind(input.contacto_id)
    .bind(input.tecnico_id)
    .bind(creado_por_id)
    .bind(fecha_cierre)
    .fetch_one(conn)
    .await?;
    Ok(row)
}

/// What happens to `fecha_cierre` on an update
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cierre {
    Keep,
    Set(DateTime<Utc>),
    Clear,
}

pub async fn update_ticket(
    conn: &mut PgConnection,
    id: i32,
    input: &UpdateTicket,
    cierre: Cierre,
) -> Result<Ticket, DatabaseError> {
    let (set_cierre, fecha_cierre) = match cierre {
        Cierre::Keep => (false, None),
        Cierre::Set(at) => (true, Some(at)),
        Cierre::Clear => (true, None),
    };

    sqlx::query_as::<_, Ticket>(
        r#"
        UPDATE tickets SET
            titulo       = COALESCE($2, titulo),
            descripcion  = COALESCE($3, descripcion),
            estado       = COALESCE($4, estado),
            prioridad    = COALESCE($5, prioridad),
            empresa_id   = COALESCE($6, empresa_id),
            sucursal_id  = CASE WHEN $7 THEN $8 ELSE sucursal_id END,
            ubicacion_id = CASE WHEN $9 THEN $10 ELSE ubicacion_id END,
            contacto_id  = CASE WHEN $11 THEN $12 ELSE contacto_id END,
            tecnico_id   = CASE WHEN $13 THEN $14 ELSE tecnico_id END,
            fecha_cierre = CASE WHEN $15 THEN $16 ELSE fecha_cierre END,
            updated_at   = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(input.titulo.as_deref().map(str::trim))
    .bind(input.descripcion.as_deref().map(str::trim))
    .bind(input.estado)
    .bind(input.prioridad)
    .bind(input.empresa_id)
    .bind(input.sucursal_id.is_some())
    .bind(input.sucursal_id.flatten())
    .bind(input.ubicacion_id.is_some())
    .bind(input.ubicacion_id.flatten())
    .bind(input.contacto_id.is_some())
    .bind(input.contacto_id.flatten())
    .bind(input.tecnico_id.is_some())
    .bind(input.tecnico_id.flatten())
    .bind(set_cierre)
    .bind(fecha_cierre)
    .fetch_optional(conn)
    .await?
    .ok_or_else(|| DatabaseError::not_found("Ticket", id))
}

/// Bump `updated_at`; fails with NotFound for an unknown ticket
pub async fn touch_ticket<'e, E: PgExecutor<'e>>(executor: E, id: i32) -> Result<(), DatabaseError> {
    let result = sqlx::query("UPDATE tickets SET updated_at = now() WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;
    if result.rows_affected() == 0 {
        return Err(DatabaseError::not_found("Ticket", id));
    }
    Ok(())
}

pub async fn delete_ticket(pool: &PgPool, id: i32) -> Result<(), DatabaseError> {
    let result = sqlx::query("DELETE FROM tickets WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| DatabaseError::from(e).on_delete())?;
    if result.rows_affected() == 0 {
        return Err(DatabaseError::not_found("Ticket", id));
    }
    Ok(())
}
