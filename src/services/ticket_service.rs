use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::info;

use crate::api::tickets::{CreateAccion, CreateTicket, UpdateAccion, UpdateTicket};
use crate::database::acciones::{delete_accion, get_accion, insert_accion, update_accion};
use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{AccionTicket, TicketDetalle};
use crate::database::tickets::{
    insert_ticket, lock_ticket, next_numero_caso, ticket_detalle, touch_ticket, update_ticket, Cierre,
};
use crate::middleware::SessionUser;
use crate::types::{EstadoTicket, TipoAccion};

#[derive(Debug, thiserror::Error)]
pub enum TicketError {
    #[error(transparent)]
    Database(#[from] DatabaseError),
    #[error("{0}")]
    Forbidden(String),
}

/// How `fecha_cierre` moves when the state goes from `previous` to `next`
pub fn cierre_transition(previous: EstadoTicket, next: Option<EstadoTicket>, now: DateTime<Utc>) -> Cierre {
    match next {
        Some(next) if next == previous => Cierre::Keep,
        Some(next) if next.is_closed() => Cierre::Set(now),
        Some(_) if previous.is_closed() => Cierre::Clear,
        _ => Cierre::Keep,
    }
}

/// Text of the automatic CAMBIO_ESTADO action, None when the state did not change
pub fn state_change_note(previous: EstadoTicket, next: Option<EstadoTicket>) -> Option<String> {
    match next {
        Some(next) if next != previous => Some(format!("Estado cambiado de {} a {}", previous, next)),
        _ => None,
    }
}

/// Only the author of an action or an ADMIN may change it
pub fn can_modify(accion: &AccionTicket, actor: &SessionUser) -> bool {
    actor.is_admin() || accion.usuario_id == actor.id
}

/// Multi-statement ticket operations, each inside one transaction
pub struct TicketService {
    pool: PgPool,
}

impl TicketService {
    pub fn new() -> Result<Self, TicketError> {
        Ok(Self {
            pool: DatabaseManager::pool()?,
        })
    }

    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert the ticket and its optional initial action atomically, then load the full detail
    pub async fn create(&self, input: &CreateTicket, actor: &SessionUser) -> Result<TicketDetalle, TicketError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;

        let numero_caso = match input.numero_caso.as_deref().map(str::trim) {
            Some(numero) => numero.to_string(),
            None => next_numero_caso(&mut *tx).await?,
        };

        let ticket = insert_ticket(&mut *tx, input, &numero_caso, actor.id).await?;

        let initial_action = input.initial_action();
        if let Some(descripcion) = initial_action {
            let tipo = input.tipo_accion_inicial.unwrap_or(TipoAccion::Nota);
            insert_accion(&mut *tx, ticket.id, actor.id, descripcion, tipo, None).await?;
        }

        tx.commit().await.map_err(DatabaseError::from)?;

        info!(
            ticket_id = ticket.id,
            numero_caso = %ticket.numero_caso,
            with_initial_action = initial_action.is_some(),
            "Ticket created"
        );

        Ok(ticket_detalle(&self.pool, ticket.id).await?)
    }

    /// Partial update; a state change stamps or clears `fecha_cierre` and logs a CAMBIO_ESTADO action
    pub async fn update(&self, id: i32, input: &UpdateTicket, actor: &SessionUser) -> Result<TicketDetalle, TicketError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;

        let current = lock_ticket(&mut *tx, id).await?;
        let cierre = cierre_transition(current.estado, input.estado, Utc::now());
        update_ticket(&mut *tx, id, input, cierre).await?;

        if let Some(note) = state_change_note(current.estado, input.estado) {
            insert_accion(&mut *tx, id, actor.id, &note, TipoAccion::CambioEstado, None).await?;
            info!(ticket_id = id, from = %current.estado, to = ?input.estado, "Ticket state changed");
        }

        tx.commit().await.map_err(DatabaseError::from)?;

        Ok(ticket_detalle(&self.pool, id).await?)
    }

    /// Append an action and bump the ticket's `updated_at`
    pub async fn create_accion(
        &self,
        ticket_id: i32,
        input: &CreateAccion,
        actor: &SessionUser,
    ) -> Result<AccionTicket, TicketError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;

        touch_ticket(&mut *tx, ticket_id).await?;
        let accion = insert_accion(
            &mut *tx,
            ticket_id,
            actor.id,
            &input.descripcion,
            input.tipo.unwrap_or(TipoAccion::Nota),
            input.fecha,
        )
        .await?;

        tx.commit().await.map_err(DatabaseError::from)?;
        Ok(accion)
    }

    pub async fn update_accion(
        &self,
        ticket_id: i32,
        accion_id: i32,
        input: &UpdateAccion,
        actor: &SessionUser,
    ) -> Result<AccionTicket, TicketError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;

        let existing = get_accion(&mut *tx, ticket_id, accion_id).await?;
        self.ensure_can_modify(&existing, actor)?;

        let accion = update_accion(&mut *tx, accion_id, input.descripcion.as_deref(), input.tipo).await?;
        touch_ticket(&mut *tx, ticket_id).await?;

        tx.commit().await.map_err(DatabaseError::from)?;
        Ok(accion)
    }

    pub async fn delete_accion(&self, ticket_id: i32, accion_id: i32, actor: &SessionUser) -> Result<(), TicketError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;

        let existing = get_accion(&mut *tx, ticket_id, accion_id).await?;
        self.ensure_can_modify(&existing, actor)?;

        delete_accion(&mut *tx, accion_id).await?;
        touch_ticket(&mut *tx, ticket_id).await?;

        tx.commit().await.map_err(DatabaseError::from)?;
        Ok(())
    }

    fn ensure_can_modify(&self, accion: &AccionTicket, actor: &SessionUser) -> Result<(), TicketError> {
        if can_modify(accion, actor) {
            Ok(())
        } else {
            tracing::warn!(accion_id = accion.id, user = %actor.email, "Action edit denied");
            Err(TicketError::Forbidden(
                "Solo el autor de la acción o un ADMIN puede modificarla".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Rol;
    use uuid::Uuid;

    fn user(role: Rol) -> SessionUser {
        SessionUser {
            id: Uuid::new_v4(),
            email: "tecnico@accesspoint.cl".into(),
            name: "Técnico".into(),
            role,
        }
    }

    fn accion_by(usuario_id: Uuid) -> AccionTicket {
        AccionTicket {
            id: 1,
            ticket_id: 1,
            usuario_id,
            usuario_nombre: "Autor".into(),
            descripcion: "Cambio de AP".into(),
            tipo: TipoAccion::Visita,
            fecha: Utc::now(),
        }
    }

    #[test]
    fn closing_stamps_and_reopening_clears() {
        let now = Utc::now();
        assert_eq!(
            cierre_transition(EstadoTicket::EnProceso, Some(EstadoTicket::Cerrado), now),
            Cierre::Set(now)
        );
        assert_eq!(
            cierre_transition(EstadoTicket::Cerrado, Some(EstadoTicket::Abierto), now),
            Cierre::Clear
        );
        assert_eq!(
            cierre_transition(EstadoTicket::Cerrado, Some(EstadoTicket::Cerrado), now),
            Cierre::Keep
        );
        assert_eq!(cierre_transition(EstadoTicket::Abierto, None, now), Cierre::Keep);
        assert_eq!(
            cierre_transition(EstadoTicket::Abierto, Some(EstadoTicket::Resuelto), now),
            Cierre::Keep
        );
    }

    #[test]
    fn state_change_note_only_on_change() {
        assert_eq!(state_change_note(EstadoTicket::Abierto, Some(EstadoTicket::Abierto)), None);
        assert_eq!(state_change_note(EstadoTicket::Abierto, None), None);
        assert_eq!(
            state_change_note(EstadoTicket::Abierto, Some(EstadoTicket::Cerrado)).as_deref(),
            Some("Estado cambiado de ABIERTO a CERRADO")
        );
    }

    #[test]
    fn author_or_admin_may_modify_actions() {
        let author = user(Rol::Tecnico);
        let other = user(Rol::Tecnico);
        let admin = user(Rol::Admin);
        let accion = accion_by(author.id);

        assert!(can_modify(&accion, &author));
        assert!(!can_modify(&accion, &other));
        assert!(can_modify(&accion, &admin));
    }
}
