/*!
 * Durable checkpoint storage for the translation cache.
 *
 * Each save replaces the stored snapshot inside a single SQLite transaction,
 * so a crash mid-write leaves the previous checkpoint intact. A SHA-256 digest
 * over the entries is stored alongside and verified on load.
 */

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::{debug, info};
use rusqlite::{Connection, OptionalExtension, params};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::errors::CheckpointError;
use crate::translation::cache::{CheckpointSnapshot, truncate_text};
use super::schema;

/// Reads and writes cache snapshots at a fixed path
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    /// Path to the checkpoint database
    path: PathBuf,
    /// Identifier of the process writing checkpoints
    run_id: String,
}

impl CheckpointStore {
    /// Create a store for the given checkpoint path
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            run_id: Uuid::new_v4().to_string(),
        }
    }

    /// Get the checkpoint file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Identifier stamped on every checkpoint this store writes
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Check whether a checkpoint has been written before
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn open(&self) -> Result<Connection, CheckpointError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(&self.path)?;
        schema::initialize_schema(&conn)?;
        Ok(conn)
    }

    /// Load the stored snapshot, or an empty one when no checkpoint exists
    pub fn load(&self) -> Result<CheckpointSnapshot, CheckpointError> {
        if !self.exists() {
            info!("No checkpoint at {:?}, starting with an empty cache", self.path);
            return Ok(CheckpointSnapshot::default());
        }

        let conn = self.open()?;

        let mut stmt = conn.prepare("SELECT original, translation FROM entries ORDER BY position")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;

        let mut snapshot = CheckpointSnapshot::default();
        for row in rows {
            let (original, translation) = row?;
            snapshot.originals.push(original);
            snapshot.translations.push(translation);
        }

        let meta: Option<(String, i64, String)> = conn
            .query_row(
                "SELECT saved_at, entry_count, digest FROM checkpoint_meta WHERE id = 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;

        if let Some((saved_at, entry_count, digest)) = meta {
            if entry_count != snapshot.len() as i64 {
                return Err(CheckpointError::Corrupt(format!(
                    "expected {} entries, found {}",
                    entry_count,
                    snapshot.len()
                )));
            }
            if digest != Self::digest(&snapshot) {
                return Err(CheckpointError::Corrupt("entry digest mismatch".to_string()));
            }
            snapshot.saved_at = DateTime::parse_from_rfc3339(&saved_at)
                .ok()
                .map(|t| t.with_timezone(&Utc));
        } else if !snapshot.is_empty() {
            return Err(CheckpointError::Corrupt("entries present without metadata".to_string()));
        }

        info!("Loaded checkpoint with {} entries from {:?}", snapshot.len(), self.path);
        Ok(snapshot)
    }

    /// Replace the stored checkpoint with the given snapshot
    pub fn save(&self, snapshot: &CheckpointSnapshot) -> Result<(), CheckpointError> {
        if snapshot.originals.len() != snapshot.translations.len() {
            return Err(CheckpointError::Corrupt(format!(
                "refusing to save {} originals with {} translations",
                snapshot.originals.len(),
                snapshot.translations.len()
            )));
        }

        let mut conn = self.open()?;
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM entries", [])?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO entries (position, original, translation) VALUES (?1, ?2, ?3)",
            )?;
            for (position, (original, translation)) in
                snapshot.originals.iter().zip(&snapshot.translations).enumerate()
            {
                insert.execute(params![position as i64, original, translation])?;
            }
        }

        let saved_at = snapshot.saved_at.unwrap_or_else(Utc::now).to_rfc3339();
        tx.execute(
            r#"
            INSERT OR REPLACE INTO checkpoint_meta (id, run_id, saved_at, entry_count, digest)
            VALUES (1, ?1, ?2, ?3, ?4)
            "#,
            params![self.run_id, saved_at, snapshot.len() as i64, Self::digest(snapshot)],
        )?;
        tx.commit()?;

        match (snapshot.originals.last(), snapshot.translations.last()) {
            (Some(original), Some(translation)) => info!(
                "BackUp: {}, {}, {}",
                snapshot.len(),
                truncate_text(original, 40),
                truncate_text(translation, 40)
            ),
            _ => info!("BackUp: 0 entries"),
        }
        debug!("Checkpoint written to {:?}", self.path);
        Ok(())
    }

    /// Digest over all entries, in order
    fn digest(snapshot: &CheckpointSnapshot) -> String {
        let mut hasher = Sha256::new();
        for (original, translation) in snapshot.originals.iter().zip(&snapshot.translations) {
            hasher.update((original.len() as u64).to_le_bytes());
            hasher.update(original.as_bytes());
            hasher.update((translation.len() as u64).to_le_bytes());
            hasher.update(translation.as_bytes());
        }
        format!("{:x}", hasher.finalize())
    }
}
