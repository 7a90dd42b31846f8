//! Durable ledger persistence.
//!
//! The whole ledger is written on every mutation. `save` either replaces the
//! previous document completely or leaves it untouched.

use crate::config::LedgerBackend;
use crate::db::pool::create_pool;
use crate::error::StorageError;
use crate::models::account::Ledger;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::PgPool;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

pub enum LedgerStore {
    File(FileStore),
    Postgres(PgStore),
}

impl LedgerStore {
    pub async fn open(backend: &LedgerBackend) -> Result<Self, StorageError> {
        match backend {
            LedgerBackend::File { path } => Ok(LedgerStore::File(FileStore::new(path.clone()))),
            LedgerBackend::Postgres { database_url } => {
                Ok(LedgerStore::Postgres(PgStore::connect(database_url).await?))
            }
        }
    }

    /// Missing storage yields an empty ledger; storage that exists but cannot
    /// be read or decoded is an error.
    pub async fn load(&self) -> Result<Ledger, StorageError> {
        match self {
            LedgerStore::File(store) => store.load().await,
            LedgerStore::Postgres(store) => store.load().await,
        }
    }

    pub async fn save(&self, ledger: &Ledger) -> Result<(), StorageError> {
        match self {
            LedgerStore::File(store) => store.save(ledger).await,
            LedgerStore::Postgres(store) => store.save(ledger).await,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            LedgerStore::File(store) => format!("file {}", store.path().display()),
            LedgerStore::Postgres(_) => "postgres table ledger_snapshot".to_string(),
        }
    }
}

/// JSON document on the local filesystem.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Ledger, StorageError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!("no ledger at {}, starting empty", self.path.display());
                return Ok(Ledger::default());
            }
            Err(e) => return Err(StorageError::io(&self.path)(e)),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn save(&self, ledger: &Ledger) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec_pretty(ledger)?;
        let tmp = self.temp_path();

        if let Err(e) = write_synced(&tmp, &bytes).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e);
        }
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(StorageError::io(&self.path)(e));
        }
        finish_save(&self.path, sync_parent_dir(&self.path).await)
    }

    // Sibling of the target so the rename never crosses filesystems
    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "ledger".to_string());
        self.path
            .with_file_name(format!(".{}.{}.tmp", name, Uuid::new_v4()))
    }
}

async fn write_synced(path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
    let mut file = tokio::fs::File::create(path)
        .await
        .map_err(StorageError::io(path))?;
    file.write_all(bytes).await.map_err(StorageError::io(path))?;
    file.sync_all().await.map_err(StorageError::io(path))?;
    Ok(())
}

// Once the rename has landed the new document is what a restart loads, so a
// failed directory sync must not report the save as failed.
fn finish_save(path: &Path, dir_sync: Result<(), StorageError>) -> Result<(), StorageError> {
    if let Err(e) = dir_sync {
        log::warn!(
            "ledger written to {} but directory sync failed: {}",
            path.display(),
            e
        );
    }
    Ok(())
}

#[cfg(unix)]
async fn sync_parent_dir(path: &Path) -> Result<(), StorageError> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let handle = tokio::fs::File::open(&dir)
        .await
        .map_err(StorageError::io(&dir))?;
    handle.sync_all().await.map_err(StorageError::io(&dir))
}

#[cfg(not(unix))]
async fn sync_parent_dir(_path: &Path) -> Result<(), StorageError> {
    Ok(())
}

/// Single-row JSONB snapshot in Postgres.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = create_pool(database_url).await?;
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS ledger_snapshot (
                id SMALLINT PRIMARY KEY,
                doc JSONB NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&pool)
        .await?;
        Ok(PgStore { pool })
    }

    async fn load(&self) -> Result<Ledger, StorageError> {
        let row: Option<(Json<Value>,)> = sqlx::query_as(
            r#"
            SELECT doc
            FROM ledger_snapshot
            WHERE id = 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some((Json(doc),)) => Ok(serde_json::from_value(doc)?),
            None => {
                log::info!("no ledger snapshot row, starting empty");
                Ok(Ledger::default())
            }
        }
    }

    async fn save(&self, ledger: &Ledger) -> Result<(), StorageError> {
        let doc = serde_json::to_value(ledger)?;
        sqlx::query(
            r#"
            INSERT INTO ledger_snapshot (id, doc, updated_at)
            VALUES (1, $1, now())
            ON CONFLICT (id) DO UPDATE
            SET doc = EXCLUDED.doc, updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(Json(doc))
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
