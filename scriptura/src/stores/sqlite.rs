//! SQLite fragment store backed by the `sqlite-vec` extension.
//!
//! Row storage and schema management go through `rig-sqlite`; similarity
//! search runs as raw SQL against the `vec0` virtual table because the
//! query embedding is computed upstream by the pipeline's own provider.

use std::mem::transmute;
use std::os::raw::c_char;
use std::path::Path;
use std::sync::Once;

use rig::OneOrMany;
use rig::embeddings::{Embedding, EmbeddingModel};
use rig_sqlite::{Column, ColumnValue, SqliteVectorStore, SqliteVectorStoreTable};
use serde::{Deserialize, Serialize};
use tokio_rusqlite::{Connection, ffi};

use super::{FragmentRecord, InsertOutcome, VectorBackend};
use crate::types::RagError;
use async_trait::async_trait;

/// Row shape persisted in the `fragments` table.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FragmentRow {
    pub id: String,
    pub reference: String,
    pub book: String,
    pub chunk_index: String,
    pub content: String,
    pub metadata: String,
}

impl SqliteVectorStoreTable for FragmentRow {
    fn name() -> &'static str {
        "fragments"
    }

    fn schema() -> Vec<Column> {
        vec![
            Column::new("id", "TEXT PRIMARY KEY"),
            Column::new("reference", "TEXT").indexed(),
            Column::new("book", "TEXT").indexed(),
            Column::new("chunk_index", "TEXT"),
            Column::new("content", "TEXT"),
            Column::new("metadata", "TEXT"),
        ]
    }

    fn id(&self) -> String {
        self.id.clone()
    }

    fn column_values(&self) -> Vec<(&'static str, Box<dyn ColumnValue>)> {
        vec![
            ("id", Box::new(self.id.clone())),
            ("reference", Box::new(self.reference.clone())),
            ("book", Box::new(self.book.clone())),
            ("chunk_index", Box::new(self.chunk_index.clone())),
            ("content", Box::new(self.content.clone())),
            ("metadata", Box::new(self.metadata.clone())),
        ]
    }
}

impl From<FragmentRecord> for FragmentRow {
    fn from(record: FragmentRecord) -> Self {
        Self {
            id: record.id,
            reference: record.reference,
            book: record.book,
            chunk_index: record.chunk_index.to_string(),
            content: record.content,
            metadata: record.metadata.to_string(),
        }
    }
}

impl From<FragmentRow> for FragmentRecord {
    fn from(row: FragmentRow) -> Self {
        Self {
            id: row.id,
            reference: row.reference,
            book: row.book,
            chunk_index: row.chunk_index.parse().unwrap_or(0),
            content: row.content,
            metadata: serde_json::from_str(&row.metadata).unwrap_or_default(),
            embedding: None,
        }
    }
}

/// Persisted fragment store with vector search.
///
/// The store holds a [`SqliteVectorStore`] for schema and inserts plus a
/// cloned connection handle for the raw queries `rig-sqlite` does not
/// cover (similarity search with a precomputed embedding, counting).
#[derive(Clone)]
pub struct SqliteFragmentStore<E>
where
    E: EmbeddingModel + 'static,
{
    inner: SqliteVectorStore<E, FragmentRow>,
    conn: Connection,
}

impl<E> SqliteFragmentStore<E>
where
    E: EmbeddingModel + Clone + Send + Sync + 'static,
{
    /// Opens (creating if necessary) the store at `path`.
    pub async fn open(path: impl AsRef<Path>, model: &E) -> Result<Self, RagError> {
        register_sqlite_vec()?;
        let conn = Connection::open(path)
            .await
            .map_err(|err| RagError::Storage(err.to_string()))?;
        conn.call(|conn| {
            conn.query_row("select vec_version()", [], |row| row.get::<_, String>(0))
                .map_err(tokio_rusqlite::Error::Rusqlite)
        })
        .await
        .map_err(|err| RagError::Storage(format!("sqlite-vec unavailable: {err}")))?;

        let conn_for_queries = conn.clone();
        let inner = SqliteVectorStore::new(conn, model)
            .await
            .map_err(|err| RagError::Storage(err.to_string()))?;
        Ok(Self {
            inner,
            conn: conn_for_queries,
        })
    }

    /// Opens the store only if something is already persisted at `path`.
    ///
    /// `None` means "not found": callers branch into the first-time-setup
    /// path instead of handling an error. An existing store that holds
    /// zero fragments is equally unusable; check [`VectorBackend::count`].
    pub async fn open_existing(
        path: impl AsRef<Path>,
        model: &E,
    ) -> Result<Option<Self>, RagError> {
        if !path.as_ref().exists() {
            return Ok(None);
        }
        Self::open(path, model).await.map(Some)
    }
}

/// Registers the `sqlite-vec` extension once per process.
fn register_sqlite_vec() -> Result<(), RagError> {
    use std::sync::Mutex;

    static INIT: Once = Once::new();
    static INIT_RESULT: Mutex<Option<Result<(), String>>> = Mutex::new(None);

    INIT.call_once(|| {
        let result = unsafe {
            type SqliteExtensionInit = unsafe extern "C" fn(
                *mut ffi::sqlite3,
                *mut *mut c_char,
                *const ffi::sqlite3_api_routines,
            ) -> i32;

            let init: unsafe extern "C" fn() = sqlite_vec::sqlite3_vec_init;
            let init_fn: SqliteExtensionInit =
                transmute::<unsafe extern "C" fn(), SqliteExtensionInit>(init);
            let rc = ffi::sqlite3_auto_extension(Some(init_fn));
            if rc == ffi::SQLITE_OK {
                Ok(())
            } else {
                Err(format!("failed to register sqlite-vec extension (code {rc})"))
            }
        };
        *INIT_RESULT.lock().expect("init result mutex poisoned") = Some(result);
    });

    INIT_RESULT
        .lock()
        .expect("init result mutex poisoned")
        .clone()
        .expect("init was called but result not set")
        .map_err(RagError::Storage)
}

#[async_trait]
impl<E> VectorBackend for SqliteFragmentStore<E>
where
    E: EmbeddingModel + Clone + Send + Sync + 'static,
{
    async fn insert_fragments(
        &self,
        fragments: Vec<FragmentRecord>,
    ) -> Result<InsertOutcome, RagError> {
        let mut rows = Vec::with_capacity(fragments.len());
        let mut skipped = 0usize;
        for record in fragments {
            let Some(embedding) = record.embedding.clone() else {
                skipped += 1;
                continue;
            };
            let row = FragmentRow::from(record);
            let embedding = Embedding {
                document: row.content.clone(),
                vec: embedding.into_iter().map(f64::from).collect(),
            };
            rows.push((row, OneOrMany::one(embedding)));
        }

        let inserted = rows.len();
        if inserted > 0 {
            self.inner
                .add_rows(rows)
                .await
                .map_err(|err| RagError::Storage(err.to_string()))?;
        }
        Ok(InsertOutcome { inserted, skipped })
    }

    async fn search_similar(
        &self,
        query_embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<(FragmentRecord, f32)>, RagError> {
        if top_k == 0 {
            return Ok(Vec::new());
        }
        let embedding_json = serde_json::to_string(query_embedding)
            .map_err(|err| RagError::Storage(err.to_string()))?;

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT f.id, f.reference, f.book, f.chunk_index, f.content, f.metadata, \
                     vec_distance_cosine(e.embedding, vec_f32(?)) AS distance \
                     FROM fragments f \
                     JOIN fragments_embeddings e ON e.rowid = f.rowid \
                     ORDER BY distance ASC, f.rowid ASC \
                     LIMIT {top_k}"
                ))
                .map_err(tokio_rusqlite::Error::Rusqlite)?;

                let rows = stmt
                    .query_map([&embedding_json], |row| {
                        let fragment = FragmentRow {
                            id: row.get(0)?,
                            reference: row.get(1)?,
                            book: row.get(2)?,
                            chunk_index: row.get(3)?,
                            content: row.get(4)?,
                            metadata: row.get(5)?,
                        };
                        let distance: f32 = row.get(6)?;
                        Ok((FragmentRecord::from(fragment), 1.0 - distance))
                    })
                    .map_err(tokio_rusqlite::Error::Rusqlite)?;

                let mut results = Vec::new();
                for row in rows {
                    results.push(row.map_err(tokio_rusqlite::Error::Rusqlite)?);
                }
                Ok(results)
            })
            .await
            .map_err(|err| RagError::Storage(err.to_string()))
    }

    async fn count(&self) -> Result<usize, RagError> {
        self.conn
            .call(|conn| {
                let count: i64 = conn
                    .query_row("SELECT COUNT(*) FROM fragments", [], |row| row.get(0))
                    .map_err(tokio_rusqlite::Error::Rusqlite)?;
                Ok(count as usize)
            })
            .await
            .map_err(|err| RagError::Storage(err.to_string()))
    }
}
