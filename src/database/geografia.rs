use serde::Serialize;
use sqlx::{PgConnection, PgExecutor, PgPool};

use super::manager::DatabaseError;
use super::models::{Comuna, ComunaJerarquia, Pais, Provincia, Region};
use crate::api::geografia::Nivel;

const JERARQUIA_SELECT: &str = r#"
    SELECT c.id, c.nombre, c.provincia_id,
           p.nombre AS provincia, p.region_id,
           r.nombre AS region, r.pais_id,
           pa.nombre AS pais
    FROM comunas c
    JOIN provincias p ON p.id = c.provincia_id
    JOIN regiones r ON r.id = p.region_id
    JOIN paises pa ON pa.id = r.pais_id
"#;

/// A row of any level, serialized with that level's field names
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GeoRecord {
    Pais(Pais),
    Region(Region),
    Provincia(Provincia),
    Comuna(Comuna),
}

impl GeoRecord {
    pub fn id(&self) -> i32 {
        match self {
            GeoRecord::Pais(row) => row.id,
            GeoRecord::Region(row) => row.id,
            GeoRecord::Provincia(row) => row.id,
            GeoRecord::Comuna(row) => row.id,
        }
    }

    fn from_parts(nivel: Nivel, id: i32, nombre: String, parent_id: Option<i32>) -> Self {
        // parent_id is NOT NULL for every level below pais
        let parent = parent_id.unwrap_or_default();
        match nivel {
            Nivel::Pais => GeoRecord::Pais(Pais { id, nombre }),
            Nivel::Region => GeoRecord::Region(Region { id, nombre, pais_id: parent }),
            Nivel::Provincia => GeoRecord::Provincia(Provincia { id, nombre, region_id: parent }),
            Nivel::Comuna => GeoRecord::Comuna(Comuna { id, nombre, provincia_id: parent }),
        }
    }
}

fn returning(nivel: Nivel) -> String {
    match nivel.parent_column() {
        Some(parent) => format!("RETURNING id, nombre, {} AS parent_id", parent),
        None => "RETURNING id, nombre, NULL::int4 AS parent_id".to_string(),
    }
}

pub async fn list_paises(pool: &PgPool) -> Result<Vec<Pais>, DatabaseError> {
    let rows = sqlx::query_as::<_, Pais>("SELECT id, nombre FROM paises ORDER BY nombre")
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn list_regiones(pool: &PgPool, pais_id: Option<i32>) -> Result<Vec<Region>, DatabaseError> {
    let rows = sqlx::query_as::<_, Region>(
        "SELECT id, nombre, pais_id FROM regiones WHERE ($1::int4 IS NULL OR pais_id = $1) ORDER BY id",
    )
    .bind(pais_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn list_provincias(pool: &PgPool, region_id: Option<i32>) -> Result<Vec<Provincia>, DatabaseError> {
    let rows = sqlx::query_as::<_, Provincia>(
        "SELECT id, nombre, region_id FROM provincias WHERE ($1::int4 IS NULL OR region_id = $1) ORDER BY nombre",
    )
    .bind(region_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn list_comunas(pool: &PgPool, provincia_id: Option<i32>) -> Result<Vec<Comuna>, DatabaseError> {
    let rows = sqlx::query_as::<_, Comuna>(
        "SELECT id, nombre, provincia_id FROM comunas WHERE ($1::int4 IS NULL OR provincia_id = $1) ORDER BY nombre",
    )
    .bind(provincia_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Comunas whose name matches `pattern` (ILIKE), with their parents' names
pub async fn buscar_comunas(pool: &PgPool, pattern: &str, limit: i64) -> Result<Vec<ComunaJerarquia>, DatabaseError> {
    let sql = format!("{} WHERE c.nombre ILIKE $1 ORDER BY c.nombre LIMIT $2", JERARQUIA_SELECT);
    let rows = sqlx::query_as::<_, ComunaJerarquia>(&sql)
        .bind(pattern)
        .bind(limit)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn comuna_jerarquia<'e, E: PgExecutor<'e>>(
    executor: E,
    comuna_id: i32,
) -> Result<Option<ComunaJerarquia>, DatabaseError> {
    let sql = format!("{} WHERE c.id = $1", JERARQUIA_SELECT);
    let row = sqlx::query_as::<_, ComunaJerarquia>(&sql)
        .bind(comuna_id)
        .fetch_optional(executor)
        .await?;
    Ok(row)
}

pub async fn insert(
    pool: &PgPool,
    nivel: Nivel,
    nombre: &str,
    parent_id: Option<i32>,
) -> Result<GeoRecord, DatabaseError> {
    let sql = match nivel.parent_column() {
        Some(parent) => format!(
            "INSERT INTO {} (nombre, {}) VALUES ($1, $2) {}",
            nivel.table(),
            parent,
            returning(nivel)
        ),
        None => format!("INSERT INTO {} (nombre) VALUES ($1) {}", nivel.table(), returning(nivel)),
    };

    let mut query = sqlx::query_as::<_, (i32, String, Option<i32>)>(&sql).bind(nombre);
    if nivel.parent_column().is_some() {
        query = query.bind(parent_id);
    }
    let (id, nombre, parent) = query.fetch_one(pool).await?;
    Ok(GeoRecord::from_parts(nivel, id, nombre, parent))
}

pub async fn update(
    pool: &PgPool,
    nivel: Nivel,
    id: i32,
    nombre: Option<&str>,
    parent_id: Option<i32>,
) -> Result<GeoRecord, DatabaseError> {
    let sql = match nivel.parent_column() {
        Some(parent) => format!(
            "UPDATE {table} SET nombre = COALESCE($2, nombre), {parent} = COALESCE($3, {parent}) WHERE id = $1 {ret}",
            table = nivel.table(),
            parent = parent,
            ret = returning(nivel)
        ),
        None => format!(
            "UPDATE {} SET nombre = COALESCE($2, nombre) WHERE id = $1 {}",
            nivel.table(),
            returning(nivel)
        ),
    };

    let mut query = sqlx::query_as::<_, (i32, String, Option<i32>)>(&sql).bind(id).bind(nombre);
    if nivel.parent_column().is_some() {
        query = query.bind(parent_id);
    }
    let (id, nombre, parent) = query
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found(nivel.label(), id))?;
    Ok(GeoRecord::from_parts(nivel, id, nombre, parent))
}

pub async fn delete(pool: &PgPool, nivel: Nivel, id: i32) -> Result<(), DatabaseError> {
    let sql = format!("DELETE FROM {} WHERE id = $1", nivel.table());
    let result = sqlx::query(&sql)
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| DatabaseError::from(e).on_delete())?;
    if result.rows_affected() == 0 {
        return Err(DatabaseError::not_found(nivel.label(), id));
    }
    Ok(())
}

/// Every row of every level, ordered by id
pub struct GeoTables {
    pub paises: Vec<Pais>,
    pub regiones: Vec<Region>,
    pub provincias: Vec<Provincia>,
    pub comunas: Vec<Comuna>,
}

pub async fn dump_all(pool: &PgPool) -> Result<GeoTables, DatabaseError> {
    let (paises, regiones, provincias, comunas) = futures::try_join!(
        sqlx::query_as::<_, Pais>("SELECT id, nombre FROM paises ORDER BY id").fetch_all(pool),
        sqlx::query_as::<_, Region>("SELECT id, nombre, pais_id FROM regiones ORDER BY id").fetch_all(pool),
        sqlx::query_as::<_, Provincia>("SELECT id, nombre, region_id FROM provincias ORDER BY id").fetch_all(pool),
        sqlx::query_as::<_, Comuna>("SELECT id, nombre, provincia_id FROM comunas ORDER BY id").fetch_all(pool),
    )?;
    Ok(GeoTables {
        paises,
        regiones,
        provincias,
        comunas,
    })
}

/// Delete every row of `nivel`, returning the count
pub async fn delete_all(conn: &mut PgConnection, nivel: Nivel) -> Result<u64, DatabaseError> {
    let sql = format!("DELETE FROM {}", nivel.table());
    let result = sqlx::query(&sql)
        .execute(conn)
        .await
        .map_err(|e| DatabaseError::from(e).on_delete())?;
    Ok(result.rows_affected())
}

/// Bulk insert preserving ids. `parents` must be empty for pais and aligned with `ids` otherwise.
pub async fn bulk_insert(
    conn: &mut PgConnection,
    nivel: Nivel,
    ids: Vec<i32>,
    nombres: Vec<String>,
    parents: Vec<i32>,
) -> Result<u64, DatabaseError> {
    let result = match nivel.parent_column() {
        Some(parent) => {
            let sql = format!(
                "INSERT INTO {} (id, nombre, {}) SELECT * FROM UNNEST($1::int4[], $2::text[], $3::int4[])",
                nivel.table(),
                parent
            );
            sqlx::query(&sql).bind(ids).bind(nombres).bind(parents).execute(&mut *conn).await?
        }
        None => {
            let sql = format!(
                "INSERT INTO {} (id, nombre) SELECT * FROM UNNEST($1::int4[], $2::text[])",
                nivel.table()
            );
            sqlx::query(&sql).bind(ids).bind(nombres).execute(&mut *conn).await?
        }
    };

    // Explicit ids bypass the identity generator; move it past the restored rows
    let reset = format!(
        "SELECT setval(pg_get_serial_sequence('{table}', 'id'), COALESCE((SELECT MAX(id) FROM {table}), 0) + 1, false)",
        table = nivel.table()
    );
    sqlx::query(&reset).execute(&mut *conn).await?;

    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geo_record_serializes_with_level_fields() {
        let region = GeoRecord::from_parts(Nivel::Region, 13, "Metropolitana".into(), Some(1));
        let json = serde_json::to_value(&region).unwrap();
        assert_eq!(json, serde_json::json!({ "id": 13, "nombre": "Metropolitana", "paisId": 1 }));

        let pais = GeoRecord::from_parts(Nivel::Pais, 1, "Chile".into(), None);
        assert_eq!(serde_json::to_value(&pais).unwrap(), serde_json::json!({ "id": 1, "nombre": "Chile" }));
    }

    #[test]
    fn returning_clause_aliases_parent() {
        assert_eq!(returning(Nivel::Comuna), "RETURNING id, nombre, provincia_id AS parent_id");
        assert!(returning(Nivel::Pais).contains("NULL::int4"));
    }
}
