//! Caché en memoria de hojas ya leídas.
//!
//! Los archivos de datos son estáticos durante la vida del proceso, así que
//! no hay invalidación: una hoja se lee la primera vez que se pide y se
//! comparte como `Arc<Table>` desde entonces. Dos peticiones simultáneas
//! pueden leer la misma hoja a la vez; gana la primera inserción.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use serde::Serialize;

use crate::error::{ApiError, ApiResult};
use crate::excel::{load_table, Table, TableSource};

#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
    pub tables: Vec<String>,
}

#[derive(Debug)]
pub struct TableCache {
    data_dir: PathBuf,
    scan_rows: usize,
    tables: RwLock<HashMap<TableSource, Arc<Table>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl TableCache {
    pub fn new(data_dir: impl Into<PathBuf>, scan_rows: usize) -> Self {
        TableCache {
            data_dir: data_dir.into(),
            scan_rows,
            tables: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn cached(&self, source: &TableSource) -> Option<Arc<Table>> {
        let guard = self.tables.read().unwrap_or_else(|e| e.into_inner());
        guard.get(source).map(Arc::clone)
    }

    /// Devuelve la hoja cacheada o la lee del disco.
    ///
    /// La lectura con calamine es síncrona y corre en `spawn_blocking`, fuera
    /// del candado; los errores no se cachean, de modo que un archivo que
    /// aparece más tarde se leerá en la siguiente petición.
    pub async fn get_or_load(&self, source: &TableSource) -> ApiResult<Arc<Table>> {
        if let Some(existing) = self.cached(source) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            log::debug!("cache hit {}", source.label());
            return Ok(existing);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let data_dir = self.data_dir.clone();
        let scan_rows = self.scan_rows;
        let wanted = *source;
        let loaded = tokio::task::spawn_blocking(move || load_table(&data_dir, &wanted, scan_rows))
            .await
            .map_err(|e| ApiError::DataSource(format!("加载 {} 的任务失败：{}", source.label(), e)))??;

        let mut guard = self.tables.write().unwrap_or_else(|e| e.into_inner());
        Ok(Arc::clone(guard.entry(*source).or_insert_with(|| Arc::new(loaded))))
    }

    /// Registra una tabla ya construida (precarga o pruebas).
    pub fn insert(&self, source: TableSource, table: Table) {
        let mut guard = self.tables.write().unwrap_or_else(|e| e.into_inner());
        guard.insert(source, Arc::new(table));
    }

    pub fn stats(&self) -> CacheStats {
        let guard = self.tables.read().unwrap_or_else(|e| e.into_inner());
        let mut tables: Vec<String> = guard.keys().map(|k| k.label()).collect();
        tables.sort();
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: guard.len(),
            tables,
        }
    }
}
