use sqlx::{PgExecutor, PgPool};

use super::geografia::comuna_jerarquia;
use super::manager::DatabaseError;
use super::models::{
    ContactoEmpresa, Direccion, DireccionDetalle, Empresa, EmpresaDetalle, EmpresaResumen, Sucursal, Ubicacion,
};
use crate::api::clean;
use crate::api::empresas::{
    CreateContacto, CreateDireccion, CreateEmpresa, CreateSucursal, CreateUbicacion, UpdateContacto,
    UpdateDireccion, UpdateEmpresa, UpdateSucursal, UpdateUbicacion,
};
use crate::validation::normalize_rut;

/// (field present, cleaned value) for `CASE WHEN $n THEN $m ELSE col END` updates
fn patch(value: &Option<String>) -> (bool, Option<String>) {
    (value.is_some(), clean(value))
}

// Empresas

pub async fn list_empresas(
    pool: &PgPool,
    incluir_inactivas: bool,
    pattern: Option<String>,
) -> Result<Vec<Empresa>, DatabaseError> {
    let rows = sqlx::query_as::<_, Empresa>(
        r#"
        SELECT * FROM empresas
        WHERE ($1 OR activa)
          AND ($2::text IS NULL OR nombre ILIKE $2 OR rut ILIKE $2)
        ORDER BY nombre
        "#,
    )
    .bind(incluir_inactivas)
    .bind(pattern)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn get_empresa<'e, E: PgExecutor<'e>>(executor: E, id: i32) -> Result<Empresa, DatabaseError> {
    sqlx::query_as::<_, Empresa>("SELECT * FROM empresas WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Empresa", id))
}

pub async fn empresa_resumen<'e, E: PgExecutor<'e>>(executor: E, id: i32) -> Result<EmpresaResumen, DatabaseError> {
    sqlx::query_as::<_, EmpresaResumen>("SELECT id, nombre, rut FROM empresas WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Empresa", id))
}

/// Empresa with its address chain, active sucursales and active contactos
pub async fn empresa_detalle(pool: &PgPool, id: i32) -> Result<EmpresaDetalle, DatabaseError> {
    let empresa = get_empresa(pool, id).await?;

    let direccion = match empresa.direccion_id {
        Some(direccion_id) => Some(direccion_detalle(pool, direccion_id).await?),
        None => None,
    };
    let (sucursales, contactos) = futures::try_join!(
        list_sucursales(pool, id, false),
        list_contactos(pool, id, false),
    )?;

    Ok(EmpresaDetalle {
        empresa,
        direccion,
        sucursales,
        contactos,
    })
}

pub async fn insert_empresa<'e, E: PgExecutor<'e>>(
    executor: E,
    input: &CreateEmpresa,
) -> Result<Empresa, DatabaseError> {
    let row = sqlx::query_as::<_, Empresa>(
        r#"
        INSERT INTO empresas (nombre, rut, giro, telefono, correo, direccion_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(input.nombre.trim())
    .bind(normalize_rut(&input.rut))
    .bind(clean(&input.giro))
    .bind(clean(&input.telefono))
    .bind(clean(&input.correo))
    .bind(input.direccion_id)
    .fetch_one(executor)
    .await?;
    Ok(row)
}

pub async fn update_empresa(pool: &PgPool, id: i32, input: &UpdateEmpresa) -> Result<Empresa, DatabaseError> {
    let (set_giro, giro) = patch(&input.giro);
    let (set_telefono, telefono) = patch(&input.telefono);
    let (set_correo, correo) = patch(&input.correo);

    sqlx::query_as::<_, Empresa>(
        r#"
        UPDATE empresas SET
            nombre       = COALESCE($2, nombre),
            rut          = COALESCE($3, rut),
            giro         = CASE WHEN $4 THEN $5 ELSE giro END,
            telefono     = CASE WHEN $6 THEN $7 ELSE telefono END,
            correo       = CASE WHEN $8 THEN $9 ELSE correo END,
            direccion_id = CASE WHEN $10 THEN $11 ELSE direccion_id END,
            activa       = COALESCE($12, activa),
            updated_at   = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(input.nombre.as_deref().map(str::trim))
    .bind(input.rut.as_deref().map(normalize_rut))
    .bind(set_giro)
    .bind(giro)
    .bind(set_telefono)
    .bind(telefono)
    .bind(set_correo)
    .bind(correo)
    .bind(input.direccion_id.is_some())
    .bind(input.direccion_id.flatten())
    .bind(input.activa)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::not_found("Empresa", id))
}

pub async fn deactivate_empresa(pool: &PgPool, id: i32) -> Result<Empresa, DatabaseError> {
    sqlx::query_as::<_, Empresa>(
        "UPDATE empresas SET activa = FALSE, updated_at = now() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::not_found("Empresa", id))
}

// Sucursales

pub async fn list_sucursales(
    pool: &PgPool,
    empresa_id: i32,
    incluir_inactivas: bool,
) -> Result<Vec<Sucursal>, DatabaseError> {
    let rows = sqlx::query_as::<_, Sucursal>(
        "SELECT * FROM sucursales WHERE empresa_id = $1 AND ($2 OR activa) ORDER BY nombre",
    )
    .bind(empresa_id)
    .bind(incluir_inactivas)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn get_sucursal<'e, E: PgExecutor<'e>>(executor: E, id: i32) -> Result<Sucursal, DatabaseError> {
    sqlx::query_as::<_, Sucursal>("SELECT * FROM sucursales WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Sucursal", id))
}

pub async fn insert_sucursal(
    pool: &PgPool,
    empresa_id: i32,
    input: &CreateSucursal,
) -> Result<Sucursal, DatabaseError> {
    let row = sqlx::query_as::<_, Sucursal>(
        r#"
        INSERT INTO sucursales (empresa_id, nombre, telefono, direccion_id)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(empresa_id)
    .bind(input.nombre.trim())
    .bind(clean(&input.telefono))
    .bind(input.direccion_id)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn update_sucursal(pool: &PgPool, id: i32, input: &UpdateSucursal) -> Result<Sucursal, DatabaseError> {
    let (set_telefono, telefono) = patch(&input.telefono);

    sqlx::query_as::<_, Sucursal>(
        r#"
        UPDATE sucursales SET
            nombre       = COALESCE($2, nombre),
            telefono     = CASE WHEN $3 THEN $4 ELSE telefono END,
            direccion_id = CASE WHEN $5 THEN $6 ELSE direccion_id END,
            activa       = COALESCE($7, activa),
            updated_at   = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(input.nombre.as_deref().map(str::trim))
    .bind(set_telefono)
    .bind(telefono)
    .bind(input.direccion_id.is_some())
    .bind(input.direccion_id.flatten())
    .bind(input.activa)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::not_found("Sucursal", id))
}

pub async fn deactivate_sucursal(pool: &PgPool, id: i32) -> Result<Sucursal, DatabaseError> {
    sqlx::query_as::<_, Sucursal>(
        "UPDATE sucursales SET activa = FALSE, updated_at = now() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::not_found("Sucursal", id))
}

// Ubicaciones

pub async fn list_ubicaciones(
    pool: &PgPool,
    sucursal_id: Option<i32>,
    incluir_inactivas: bool,
) -> Result<Vec<Ubicacion>, DatabaseError> {
    let rows = sqlx::query_as::<_, Ubicacion>(
        r#"
        SELECT * FROM ubicaciones
        WHERE ($1::int4 IS NULL OR sucursal_id = $1) AND ($2 OR activa)
        ORDER BY nombre
        "#,
    )
    .bind(sucursal_id)
    .bind(incluir_inactivas)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn get_ubicacion<'e, E: PgExecutor<'e>>(executor: E, id: i32) -> Result<Ubicacion, DatabaseError> {
    sqlx::query_as::<_, Ubicacion>("SELECT * FROM ubicaciones WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Ubicación", id))
}

pub async fn insert_ubicacion(pool: &PgPool, input: &CreateUbicacion) -> Result<Ubicacion, DatabaseError> {
    let row = sqlx::query_as::<_, Ubicacion>(
        "INSERT INTO ubicaciones (sucursal_id, nombre, descripcion) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(input.sucursal_id)
    .bind(input.nombre.trim())
    .bind(clean(&input.descripcion))
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn update_ubicacion(pool: &PgPool, id: i32, input: &UpdateUbicacion) -> Result<Ubicacion, DatabaseError> {
    let (set_descripcion, descripcion) = patch(&input.descripcion);

    sqlx::query_as::<_, Ubicacion>(
        r#"
        UPDATE ubicaciones SET
            nombre      = COALESCE($2, nombre),
            descripcion = CASE WHEN $3 THEN $4 ELSE descripcion END,
            activa      = COALESCE($5, activa),
            updated_at  = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(input.nombre.as_deref().map(str::trim))
    .bind(set_descripcion)
    .bind(descripcion)
    .bind(input.activa)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::not_found("Ubicación", id))
}

pub async fn deactivate_ubicacion(pool: &PgPool, id: i32) -> Result<Ubicacion, DatabaseError> {
    sqlx::query_as::<_, Ubicacion>(
        "UPDATE ubicaciones SET activa = FALSE, updated_at = now() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::not_found("Ubicación", id))
}

// Contactos

pub async fn list_contactos(
    pool: &PgPool,
    empresa_id: i32,
    incluir_inactivos: bool,
) -> Result<Vec<ContactoEmpresa>, DatabaseError> {
    let rows = sqlx::query_as::<_, ContactoEmpresa>(
        "SELECT * FROM contactos_empresa WHERE empresa_id = $1 AND ($2 OR activo) ORDER BY nombre",
    )
    .bind(empresa_id)
    .bind(incluir_inactivos)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn get_contacto<'e, E: PgExecutor<'e>>(executor: E, id: i32) -> Result<ContactoEmpresa, DatabaseError> {
    sqlx::query_as::<_, ContactoEmpresa>("SELECT * FROM contactos_empresa WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Contacto", id))
}

pub async fn insert_contacto(
    pool: &PgPool,
    empresa_id: i32,
    input: &CreateContacto,
) -> Result<ContactoEmpresa, DatabaseError> {
    let row = sqlx::query_as::<_, ContactoEmpresa>(
        r#"
        INSERT INTO contactos_empresa (empresa_id, nombre, cargo, correo, telefono)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(empresa_id)
    .bind(input.nombre.trim())
    .bind(clean(&input.cargo))
    .bind(clean(&input.correo))
    .bind(clean(&input.telefono))
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn update_contacto(
    pool: &PgPool,
    id: i32,
    input: &UpdateContacto,
) -> Result<ContactoEmpresa, DatabaseError> {
    let (set_cargo, cargo) = patch(&input.cargo);
    let (set_correo, correo) = patch(&input.correo);
    let (set_telefono, telefono) = patch(&input.telefono);

    sqlx::query_as::<_, ContactoEmpresa>(
        r#"
        UPDATE contactos_empresa SET
            nombre     = COALESCE($2, nombre),
            cargo      = CASE WHEN $3 THEN $4 ELSE cargo END,
            correo     = CASE WHEN $5 THEN $6 ELSE correo END,
            telefono   = CASE WHEN $7 THEN $8 ELSE telefono END,
            activo     = COALESCE($9, activo),
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(input.nombre.as_deref().map(str::trim))
    .bind(set_cargo)
    .bind(cargo)
    .bind(set_correo)
    .bind(correo)
    .bind(set_telefono)
    .bind(telefono)
    .bind(input.activo)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::not_found("Contacto", id))
}

pub async fn deactivate_contacto(pool: &PgPool, id: i32) -> Result<ContactoEmpresa, DatabaseError> {
    sqlx::query_as::<_, ContactoEmpresa>(
        "UPDATE contactos_empresa SET activo = FALSE, updated_at = now() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::not_found("Contacto", id))
}

// Direcciones

pub async fn direccion_detalle(pool: &PgPool, id: i32) -> Result<DireccionDetalle, DatabaseError> {
    let direccion = sqlx::query_as::<_, Direccion>("SELECT * FROM direcciones WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Dirección", id))?;
    with_comuna(pool, direccion).await
}

async fn with_comuna(pool: &PgPool, direccion: Direccion) -> Result<DireccionDetalle, DatabaseError> {
    let comuna = comuna_jerarquia(pool, direccion.comuna_id)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Comuna", direccion.comuna_id))?;
    Ok(DireccionDetalle { direccion, comuna })
}

pub async fn insert_direccion(pool: &PgPool, input: &CreateDireccion) -> Result<DireccionDetalle, DatabaseError> {
    let direccion = sqlx::query_as::<_, Direccion>(
        r#"
        INSERT INTO direcciones (calle, numero, departamento, referencia, comuna_id)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(input.calle.trim())
    .bind(input.numero.trim())
    .bind(clean(&input.departamento))
    .bind(clean(&input.referencia))
    .bind(input.comuna_id)
    .fetch_one(pool)
    .await?;
    with_comuna(pool, direccion).await
}

pub async fn update_direccion(
    pool: &PgPool,
    id: i32,
    input: &UpdateDireccion,
) -> Result<DireccionDetalle, DatabaseError> {
    let (set_departamento, departamento) = patch(&input.departamento);
    let (set_referencia, referencia) = patch(&input.referencia);

    let direccion = sqlx::query_as::<_, Direccion>(
        r#"
        UPDATE direcciones SET
            calle        = COALESCE($2, calle),
            numero       = COALESCE($3, numero),
            departamento = CASE WHEN $4 THEN $5 ELSE departamento END,
            referencia   = CASE WHEN $6 THEN $7 ELSE referencia END,
            comuna_id    = COALESCE($8, comuna_id)
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(input.calle.as_deref().map(str::trim))
    .bind(input.numero.as_deref().map(str::trim))
    .bind(set_departamento)
    .bind(departamento)
    .bind(set_referencia)
    .bind(referencia)
    .bind(input.comuna_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::not_found("Dirección", id))?;
    with_comuna(pool, direccion).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_distinguishes_absent_from_cleared() {
        assert_eq!(patch(&None), (false, None));
        assert_eq!(patch(&Some("   ".into())), (true, None));
        assert_eq!(patch(&Some(" Gerente ".into())), (true, Some("Gerente".into())));
    }
}
