mod common;

use accesspoint_control::api::geografia::Nivel;
use accesspoint_control::database::geografia::{self, dump_all, GeoTables};
use accesspoint_control::database::models::{Comuna, Pais, Provincia, Region};
use accesspoint_control::services::{GeoSnapshot, GeografiaBackupService, SnapshotError};
use anyhow::Result;
use common::db;
use sqlx::PgPool;

fn tables() -> GeoTables {
    GeoTables {
        paises: vec![Pais { id: 9001, nombre: "Chile".into() }],
        regiones: vec![Region { id: 9013, nombre: "Metropolitana de Santiago".into(), pais_id: 9001 }],
        provincias: vec![Provincia { id: 9131, nombre: "Santiago".into(), region_id: 9013 }],
        comunas: vec![
            Comuna { id: 913101, nombre: "Santiago".into(), provincia_id: 9131 },
            Comuna { id: 913123, nombre: "Providencia".into(), provincia_id: 9131 },
        ],
    }
}

/// Addresses pin comunas; drop them so the geography tables can be emptied
async fn release_addresses(pool: &PgPool) -> Result<()> {
    sqlx::query("UPDATE empresas SET direccion_id = NULL").execute(pool).await?;
    sqlx::query("UPDATE sucursales SET direccion_id = NULL").execute(pool).await?;
    sqlx::query("DELETE FROM direcciones").execute(pool).await?;
    Ok(())
}

#[tokio::test]
async fn restore_replaces_tables_and_moves_sequences_past_restored_ids() -> Result<()> {
    let Some(pool) = db::pool().await? else { return Ok(()) };
    release_addresses(&pool).await?;

    // Existing rows of every level, so the delete pass has children to clear first
    let pais = geografia::insert(&pool, Nivel::Pais, &format!("País {}", db::unique()), None).await?;
    let region = geografia::insert(&pool, Nivel::Region, "Región previa", Some(pais.id())).await?;
    let provincia = geografia::insert(&pool, Nivel::Provincia, "Provincia previa", Some(region.id())).await?;
    geografia::insert(&pool, Nivel::Comuna, "Comuna previa", Some(provincia.id())).await?;

    let service = GeografiaBackupService::with_pool(pool.clone());
    let snapshot = GeoSnapshot::from_tables(tables())?;
    let report = service.restore(&snapshot).await?;

    assert!(report.eliminados.comunas >= 1);
    assert!(report.eliminados.paises >= 1);
    assert_eq!(report.insertados.paises, 1);
    assert_eq!(report.insertados.regiones, 1);
    assert_eq!(report.insertados.provincias, 1);
    assert_eq!(report.insertados.comunas, 2);

    let restored = dump_all(&pool).await?;
    let expected = tables();
    assert_eq!(restored.paises, expected.paises);
    assert_eq!(restored.regiones, expected.regiones);
    assert_eq!(restored.provincias, expected.provincias);
    assert_eq!(restored.comunas, expected.comunas);

    // Identity sequences continue after the restored ids
    let nuevo_pais = geografia::insert(&pool, Nivel::Pais, "Argentina", None).await?;
    assert!(nuevo_pais.id() > 9001, "{}", nuevo_pais.id());
    let nueva_comuna = geografia::insert(&pool, Nivel::Comuna, "Ñuñoa", Some(9131)).await?;
    assert!(nueva_comuna.id() > 913123, "{}", nueva_comuna.id());

    // A snapshot that fails verification touches nothing
    let before = dump_all(&pool).await?;
    let mut tampered = GeoSnapshot::from_tables(tables())?;
    tampered.comunas[0].nombre = "Otra".into();
    let err = service.restore(&tampered).await.unwrap_err();
    assert!(matches!(err, SnapshotError::ChecksumMismatch { .. }), "{:?}", err);
    let after = dump_all(&pool).await?;
    assert_eq!(after.paises, before.paises);
    assert_eq!(after.comunas, before.comunas);

    // Round trip through backup
    let backup = service.backup().await?;
    assert!(backup.verify().is_ok());
    assert_eq!(backup.paises.len(), 2);
    assert_eq!(backup.comunas.len(), 3);
    Ok(())
}
