//! Geography snapshot: dump the four geography tables to JSON and restore them.
//!
//! Restore runs in two transactions. The first deletes every row children-first
//! (comunas, provincias, regiones, paises); the second inserts parents-first with
//! the original ids and moves the identity sequences past them. A failure after
//! the first commit leaves the tables empty; re-running the restore recovers.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use tracing::info;

use crate::api::geografia::Nivel;
use crate::database::geografia::{bulk_insert, delete_all, dump_all, GeoTables};
use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{Comuna, Pais, Provincia, Region};

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error(transparent)]
    Database(#[from] DatabaseError),
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Unsupported snapshot version {0}")]
    UnsupportedVersion(u32),
    #[error("Checksum mismatch: expected {expected}, computed {computed}")]
    ChecksumMismatch { expected: String, computed: String },
    #[error("{nivel} {id} references missing parent {parent_id}")]
    DanglingReference {
        nivel: &'static str,
        id: i32,
        parent_id: i32,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoSnapshot {
    pub version: u32,
    pub created_at: DateTime<Utc>,
    /// SHA-256 (hex) of the serialized table data
    pub checksum: String,
    pub paises: Vec<Pais>,
    pub regiones: Vec<Region>,
    pub provincias: Vec<Provincia>,
    pub comunas: Vec<Comuna>,
}

/// Rows deleted and inserted per level
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RestoreReport {
    pub eliminados: LevelCounts,
    pub insertados: LevelCounts,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct LevelCounts {
    pub paises: u64,
    pub regiones: u64,
    pub provincias: u64,
    pub comunas: u64,
}

impl LevelCounts {
    fn set(&mut self, nivel: Nivel, count: u64) {
        match nivel {
            Nivel::Pais => self.paises = count,
            Nivel::Region => self.regiones = count,
            Nivel::Provincia => self.provincias = count,
            Nivel::Comuna => self.comunas = count,
        }
    }
}

impl GeoSnapshot {
    pub fn from_tables(tables: GeoTables) -> Result<Self, SnapshotError> {
        let mut snapshot = Self {
            version: SNAPSHOT_VERSION,
            created_at: Utc::now(),
            checksum: String::new(),
            paises: tables.paises,
            regiones: tables.regiones,
            provincias: tables.provincias,
            comunas: tables.comunas,
        };
        snapshot.checksum = snapshot.compute_checksum()?;
        Ok(snapshot)
    }

    pub fn compute_checksum(&self) -> Result<String, SnapshotError> {
        let data = serde_json::to_vec(&(&self.paises, &self.regiones, &self.provincias, &self.comunas))?;
        let mut hasher = Sha256::new();
        hasher.update(&data);
        Ok(format!("{:x}", hasher.finalize()))
    }

    /// Version, checksum and parent references must all hold before any row is deleted
    pub fn verify(&self) -> Result<(), SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(self.version));
        }

        let computed = self.compute_checksum()?;
        if computed != self.checksum {
            return Err(SnapshotError::ChecksumMismatch {
                expected: self.checksum.clone(),
                computed,
            });
        }

        let paises: HashSet<i32> = self.paises.iter().map(|p| p.id).collect();
        let regiones: HashSet<i32> = self.regiones.iter().map(|r| r.id).collect();
        let provincias: HashSet<i32> = self.provincias.iter().map(|p| p.id).collect();

        let dangling = self
            .regiones
            .iter()
            .find(|r| !paises.contains(&r.pais_id))
            .map(|r| ("regiones", r.id, r.pais_id))
            .or_else(|| {
                self.provincias
                    .iter()
                    .find(|p| !regiones.contains(&p.region_id))
                    .map(|p| ("provincias", p.id, p.region_id))
            })
            .or_else(|| {
                self.comunas
                    .iter()
                    .find(|c| !provincias.contains(&c.provincia_id))
                    .map(|c| ("comunas", c.id, c.provincia_id))
            });

        match dangling {
            Some((nivel, id, parent_id)) => Err(SnapshotError::DanglingReference { nivel, id, parent_id }),
            None => Ok(()),
        }
    }

    /// (ids, nombres, parent ids) of one level, in insert order
    fn columns(&self, nivel: Nivel) -> (Vec<i32>, Vec<String>, Vec<i32>) {
        match nivel {
            Nivel::Pais => (
                self.paises.iter().map(|p| p.id).collect(),
                self.paises.iter().map(|p| p.nombre.clone()).collect(),
                Vec::new(),
            ),
            Nivel::Region => (
                self.regiones.iter().map(|r| r.id).collect(),
                self.regiones.iter().map(|r| r.nombre.clone()).collect(),
                self.regiones.iter().map(|r| r.pais_id).collect(),
            ),
            Nivel::Provincia => (
                self.provincias.iter().map(|p| p.id).collect(),
                self.provincias.iter().map(|p| p.nombre.clone()).collect(),
                self.provincias.iter().map(|p| p.region_id).collect(),
            ),
            Nivel::Comuna => (
                self.comunas.iter().map(|c| c.id).collect(),
                self.comunas.iter().map(|c| c.nombre.clone()).collect(),
                self.comunas.iter().map(|c| c.provincia_id).collect(),
            ),
        }
    }
}

/// Children first
pub fn delete_order() -> impl Iterator<Item = Nivel> {
    Nivel::ALL.into_iter().rev()
}

/// Parents first
pub fn insert_order() -> impl Iterator<Item = Nivel> {
    Nivel::ALL.into_iter()
}

pub struct GeografiaBackupService {
    pool: PgPool,
}

impl GeografiaBackupService {
    pub fn new() -> Result<Self, SnapshotError> {
        Ok(Self {
            pool: DatabaseManager::pool()?,
        })
    }

    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn backup(&self) -> Result<GeoSnapshot, SnapshotError> {
        let tables = dump_all(&self.pool).await?;
        let snapshot = GeoSnapshot::from_tables(tables)?;
        info!(
            paises = snapshot.paises.len(),
            regiones = snapshot.regiones.len(),
            provincias = snapshot.provincias.len(),
            comunas = snapshot.comunas.len(),
            "Geography backup created"
        );
        Ok(snapshot)
    }

    pub async fn restore(&self, snapshot: &GeoSnapshot) -> Result<RestoreReport, SnapshotError> {
        snapshot.verify()?;
        let mut report = RestoreReport::default();

        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;
        for nivel in delete_order() {
            let deleted = delete_all(&mut *tx, nivel).await?;
            info!(table = nivel.table(), deleted, "Restore: cleared table");
            report.eliminados.set(nivel, deleted);
        }
        tx.commit().await.map_err(DatabaseError::from)?;

        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;
        for nivel in insert_order() {
            let (ids, nombres, parents) = snapshot.columns(nivel);
            let inserted = bulk_insert(&mut *tx, nivel, ids, nombres, parents).await?;
            info!(table = nivel.table(), inserted, "Restore: inserted rows");
            report.insertados.set(nivel, inserted);
        }
        tx.commit().await.map_err(DatabaseError::from)?;

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> GeoSnapshot {
        GeoSnapshot::from_tables(GeoTables {
            paises: vec![Pais { id: 1, nombre: "Chile".into() }],
            regiones: vec![Region { id: 13, nombre: "Metropolitana de Santiago".into(), pais_id: 1 }],
            provincias: vec![Provincia { id: 131, nombre: "Santiago".into(), region_id: 13 }],
            comunas: vec![
                Comuna { id: 13101, nombre: "Santiago".into(), provincia_id: 131 },
                Comuna { id: 13123, nombre: "Providencia".into(), provincia_id: 131 },
            ],
        })
        .unwrap()
    }

    #[test]
    fn fresh_snapshot_verifies() {
        let snapshot = sample();
        assert_eq!(snapshot.checksum.len(), 64);
        assert!(snapshot.verify().is_ok());
    }

    #[test]
    fn tampered_snapshot_fails_checksum() {
        let mut snapshot = sample();
        snapshot.comunas[1].nombre = "Ñuñoa".into();
        assert!(matches!(snapshot.verify(), Err(SnapshotError::ChecksumMismatch { .. })));
    }

    #[test]
    fn checksum_survives_json_round_trip() {
        let snapshot = sample();
        let json = serde_json::to_string(&snapshot).unwrap();
        let parsed: GeoSnapshot = serde_json::from_str(&json).unwrap();
        assert!(parsed.verify().is_ok());
    }

    #[test]
    fn dangling_parent_is_rejected() {
        let mut snapshot = sample();
        snapshot.comunas.push(Comuna { id: 9, nombre: "Huérfana".into(), provincia_id: 999 });
        snapshot.checksum = snapshot.compute_checksum().unwrap();
        assert!(matches!(
            snapshot.verify(),
            Err(SnapshotError::DanglingReference { nivel: "comunas", id: 9, parent_id: 999 })
        ));
    }

    #[test]
    fn unknown_version_is_rejected() {
        let mut snapshot = sample();
        snapshot.version = 7;
        assert!(matches!(snapshot.verify(), Err(SnapshotError::UnsupportedVersion(7))));
    }

    #[test]
    fn restore_deletes_children_first_and_inserts_parents_first() {
        let deletes: Vec<_> = delete_order().map(|n| n.table()).collect();
        let inserts: Vec<_> = insert_order().map(|n| n.table()).collect();
        assert_eq!(deletes, ["comunas", "provincias", "regiones", "paises"]);
        assert_eq!(inserts, ["paises", "regiones", "provincias", "comunas"]);
    }

    #[test]
    fn columns_align_with_rows() {
        let (ids, nombres, parents) = sample().columns(Nivel::Comuna);
        assert_eq!(ids, vec![13101, 13123]);
        assert_eq!(nombres, vec!["Santiago", "Providencia"]);
        assert_eq!(parents, vec![131, 131]);
        assert!(sample().columns(Nivel::Pais).2.is_empty());
    }
}
