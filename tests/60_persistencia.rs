mod common;

use accesspoint_control::api::empresas::{CreateContacto, CreateSucursal, CreateUbicacion};
use accesspoint_control::api::geografia::Nivel;
use accesspoint_control::api::tickets::{CreateTicket, UpdateTicket};
use accesspoint_control::database::empresas::{
    deactivate_contacto, deactivate_empresa, deactivate_sucursal, deactivate_ubicacion, get_contacto,
    get_empresa, get_sucursal, get_ubicacion, insert_contacto, insert_sucursal, insert_ubicacion,
    list_contactos, list_empresas, list_sucursales, list_ubicaciones,
};
use accesspoint_control::database::geografia;
use accesspoint_control::database::DatabaseError;
use accesspoint_control::error::ApiError;
use accesspoint_control::services::{TicketError, TicketService};
use accesspoint_control::types::{EstadoTicket, Rol, TipoAccion};
use anyhow::Result;
use axum::http::StatusCode;
use common::db;

fn nuevo_ticket(empresa_id: i32, titulo: &str, accion_inicial: Option<&str>) -> CreateTicket {
    CreateTicket {
        numero_caso: None,
        titulo: titulo.to_string(),
        descripcion: "AP del segundo piso sin señal".to_string(),
        estado: None,
        prioridad: None,
        empresa_id,
        sucursal_id: None,
        ubicacion_id: None,
        contacto_id: None,
        tecnico_id: None,
        accion_inicial: accion_inicial.map(str::to_string),
        tipo_accion_inicial: None,
    }
}

#[tokio::test]
async fn deactivation_flips_flag_and_keeps_rows() -> Result<()> {
    let Some(pool) = db::pool().await? else { return Ok(()) };

    let empresa = db::empresa(&pool).await?;
    let sucursal = insert_sucursal(
        &pool,
        empresa.id,
        &CreateSucursal { nombre: "Casa Matriz".into(), telefono: None, direccion_id: None },
    )
    .await?;
    let ubicacion = insert_ubicacion(
        &pool,
        &CreateUbicacion { sucursal_id: sucursal.id, nombre: "Rack 2".into(), descripcion: None },
    )
    .await?;
    let contacto = insert_contacto(
        &pool,
        empresa.id,
        &CreateContacto { nombre: "Ana Rojas".into(), cargo: None, correo: None, telefono: None },
    )
    .await?;

    assert!(!deactivate_ubicacion(&pool, ubicacion.id).await?.activa);
    assert!(!deactivate_sucursal(&pool, sucursal.id).await?.activa);
    assert!(!deactivate_contacto(&pool, contacto.id).await?.activo);
    assert!(!deactivate_empresa(&pool, empresa.id).await?.activa);

    // Rows are still readable by id
    assert!(!get_empresa(&pool, empresa.id).await?.activa);
    assert!(!get_sucursal(&pool, sucursal.id).await?.activa);
    assert!(!get_ubicacion(&pool, ubicacion.id).await?.activa);
    assert!(!get_contacto(&pool, contacto.id).await?.activo);

    // Hidden from default listings, present when inactive rows are requested
    let pattern = Some(format!("%{}%", empresa.rut));
    assert!(list_empresas(&pool, false, pattern.clone()).await?.is_empty());
    assert_eq!(list_empresas(&pool, true, pattern).await?.len(), 1);
    assert!(list_sucursales(&pool, empresa.id, false).await?.is_empty());
    assert_eq!(list_sucursales(&pool, empresa.id, true).await?.len(), 1);
    assert!(list_ubicaciones(&pool, Some(sucursal.id), false).await?.is_empty());
    assert_eq!(list_ubicaciones(&pool, Some(sucursal.id), true).await?.len(), 1);
    assert!(list_contactos(&pool, empresa.id, false).await?.is_empty());
    assert_eq!(list_contactos(&pool, empresa.id, true).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn failed_ticket_create_persists_nothing() -> Result<()> {
    let Some(pool) = db::pool().await? else { return Ok(()) };
    let actor = db::usuario(&pool, Rol::Tecnico).await?;
    let service = TicketService::with_pool(pool.clone());

    let titulo = format!("Sin empresa {}", db::unique());
    let accion = format!("Visita inicial {}", db::unique());
    let input = nuevo_ticket(i32::MAX, &titulo, Some(&accion));

    let err = service.create(&input, &actor).await.unwrap_err();
    match &err {
        TicketError::Database(DatabaseError::ForeignKeyViolation { constraint, still_referenced }) => {
            assert!(!still_referenced);
            assert_eq!(constraint.as_deref(), Some("tickets_empresa_id_fkey"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(ApiError::from(err).status_code(), StatusCode::BAD_REQUEST);

    assert_eq!(db::count(&pool, "SELECT count(*) FROM tickets WHERE titulo = $1", &titulo).await?, 0);
    assert_eq!(
        db::count(&pool, "SELECT count(*) FROM acciones_ticket WHERE descripcion = $1", &accion).await?,
        0
    );
    Ok(())
}

#[tokio::test]
async fn ticket_with_initial_action_is_created_together() -> Result<()> {
    let Some(pool) = db::pool().await? else { return Ok(()) };
    let actor = db::usuario(&pool, Rol::Tecnico).await?;
    let empresa = db::empresa(&pool).await?;
    let service = TicketService::with_pool(pool.clone());

    let input = nuevo_ticket(empresa.id, "Switch reiniciándose", Some("Revisión remota del switch"));
    let ticket = service.create(&input, &actor).await?;

    assert!(ticket.ticket.numero_caso.starts_with("TCK-"), "{}", ticket.ticket.numero_caso);
    assert_eq!(ticket.ticket.estado, EstadoTicket::Abierto);
    assert_eq!(ticket.ticket.fecha_cierre, None);
    assert_eq!(ticket.creado_por.id, actor.id);
    assert_eq!(ticket.acciones.len(), 1);
    assert_eq!(ticket.acciones[0].descripcion, "Revisión remota del switch");
    assert_eq!(ticket.acciones[0].tipo, TipoAccion::Nota);
    assert_eq!(ticket.acciones[0].usuario_id, actor.id);
    Ok(())
}

#[tokio::test]
async fn closing_and_reopening_track_fecha_cierre_and_log_state_changes() -> Result<()> {
    let Some(pool) = db::pool().await? else { return Ok(()) };
    let actor = db::usuario(&pool, Rol::Tecnico).await?;
    let empresa = db::empresa(&pool).await?;
    let service = TicketService::with_pool(pool.clone());

    let created = service.create(&nuevo_ticket(empresa.id, "Enlace caído", None), &actor).await?;
    let id = created.ticket.id;
    assert!(created.acciones.is_empty());

    let cerrar = UpdateTicket { estado: Some(EstadoTicket::Cerrado), ..Default::default() };
    let closed = service.update(id, &cerrar, &actor).await?;
    assert!(closed.ticket.fecha_cierre.is_some());
    assert_eq!(closed.acciones.len(), 1);
    assert_eq!(closed.acciones[0].tipo, TipoAccion::CambioEstado);
    assert_eq!(closed.acciones[0].descripcion, "Estado cambiado de ABIERTO a CERRADO");

    // Same state again: nothing changes
    let again = service.update(id, &cerrar, &actor).await?;
    assert_eq!(again.ticket.fecha_cierre, closed.ticket.fecha_cierre);
    assert_eq!(again.acciones.len(), 1);

    let reabrir = UpdateTicket { estado: Some(EstadoTicket::EnProceso), ..Default::default() };
    let reopened = service.update(id, &reabrir, &actor).await?;
    assert_eq!(reopened.ticket.fecha_cierre, None);
    assert_eq!(reopened.acciones.len(), 2);
    assert_eq!(reopened.acciones[1].descripcion, "Estado cambiado de CERRADO a EN_PROCESO");
    Ok(())
}

#[tokio::test]
async fn deleting_referenced_geography_is_conflict() -> Result<()> {
    let Some(pool) = db::pool().await? else { return Ok(()) };

    let pais = geografia::insert(&pool, Nivel::Pais, &format!("País {}", db::unique()), None).await?;
    let region = geografia::insert(&pool, Nivel::Region, "Región de prueba", Some(pais.id())).await?;

    let err = geografia::delete(&pool, Nivel::Pais, pais.id()).await.unwrap_err();
    assert!(
        matches!(err, DatabaseError::ForeignKeyViolation { still_referenced: true, .. }),
        "{:?}",
        err
    );
    assert_eq!(ApiError::from(err).status_code(), StatusCode::CONFLICT);

    geografia::delete(&pool, Nivel::Region, region.id()).await?;
    geografia::delete(&pool, Nivel::Pais, pais.id()).await?;
    Ok(())
}
