//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the GraphStore trait.

use crate::state::{PageStatus, StatusKind};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{GraphStore, StorageError, StorageResult};
use crate::storage::{LinkRecord, PageRecord, PendingPage, DEFAULT_RANK};
use crate::SpiderError;
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const PAGE_COLUMNS: &str = "id, url, content, error, old_rank, new_rank";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(SpiderError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, SpiderError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> Result<Self, SpiderError> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

impl GraphStore for SqliteStorage {
    // ===== Page Management =====

    fn ensure_page(&mut self, url: &str) -> StorageResult<i64> {
        Ok(ensure_page_on(&self.conn, url)?)
    }

    fn record_fetch_success(&mut self, url: &str, content: &[u8]) -> StorageResult<()> {
        let updated = self.conn.execute(
            "UPDATE Pages SET content = ?1 WHERE url = ?2",
            params![content, url],
        )?;
        if updated == 0 {
            return Err(StorageError::PageNotFound(url.to_string()));
        }
        Ok(())
    }

    fn record_fetch_error(&mut self, url: &str, code: i64) -> StorageResult<()> {
        let updated = self.conn.execute(
            "UPDATE Pages SET error = ?1 WHERE url = ?2",
            params![code, url],
        )?;
        if updated == 0 {
            return Err(StorageError::PageNotFound(url.to_string()));
        }
        Ok(())
    }

    fn delete_page(&mut self, url: &str) -> StorageResult<()> {
        let tx = self.conn.transaction()?;

        let page_id: Option<i64> = tx
            .query_row("SELECT id FROM Pages WHERE url = ?1", params![url], |row| {
                row.get(0)
            })
            .optional()?;

        if let Some(id) = page_id {
            tx.execute(
                "DELETE FROM Links WHERE from_id = ?1 OR to_id = ?1",
                params![id],
            )?;
            tx.execute("DELETE FROM Claims WHERE page_id = ?1", params![id])?;
            tx.execute("DELETE FROM Pages WHERE id = ?1", params![id])?;
        }

        tx.commit()?;
        Ok(())
    }

    fn get_page(&self, page_id: i64) -> StorageResult<PageRecord> {
        let page = self
            .conn
            .query_row(
                &format!("SELECT {} FROM Pages WHERE id = ?1", PAGE_COLUMNS),
                params![page_id],
                page_from_row,
            )
            .optional()?;

        page.ok_or_else(|| StorageError::PageNotFound(format!("Page ID {}", page_id)))
    }

    fn get_page_by_url(&self, url: &str) -> StorageResult<Option<PageRecord>> {
        let page = self
            .conn
            .query_row(
                &format!("SELECT {} FROM Pages WHERE url = ?1", PAGE_COLUMNS),
                params![url],
                page_from_row,
            )
            .optional()?;

        Ok(page)
    }

    // ===== Link Management =====

    fn clear_outgoing_links(&mut self, from_id: i64) -> StorageResult<()> {
        self.conn
            .execute("DELETE FROM Links WHERE from_id = ?1", params![from_id])?;
        Ok(())
    }

    fn add_link(&mut self, from_id: i64, to_id: i64) -> StorageResult<bool> {
        Ok(insert_link_on(&self.conn, from_id, to_id)?)
    }

    fn get_outgoing_links(&self, page_id: i64) -> StorageResult<Vec<LinkRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT from_id, to_id FROM Links WHERE from_id = ?1 ORDER BY rowid")?;

        let links = stmt
            .query_map(params![page_id], |row| {
                Ok(LinkRecord {
                    from_id: row.get(0)?,
                    to_id: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(links)
    }

    fn commit_fetch(
        &mut self,
        page_id: i64,
        content: &[u8],
        targets: &[String],
    ) -> StorageResult<usize> {
        let tx = self.conn.transaction()?;

        let updated = tx.execute(
            "UPDATE Pages SET content = ?1 WHERE id = ?2",
            params![content, page_id],
        )?;
        if updated == 0 {
            return Err(StorageError::PageNotFound(format!("Page ID {}", page_id)));
        }

        let mut added = 0;
        for target in targets {
            let to_id = ensure_page_on(&tx, target)?;
            if insert_link_on(&tx, page_id, to_id)? {
                added += 1;
            }
        }

        tx.commit()?;
        Ok(added)
    }

    // ===== Frontier Management =====

    fn next_pending_random(&self) -> StorageResult<Option<PendingPage>> {
        let page = self
            .conn
            .query_row(
                "SELECT id, url FROM Pages WHERE content IS NULL AND error IS NULL
                 ORDER BY RANDOM() LIMIT 1",
                [],
                |row| {
                    Ok(PendingPage {
                        id: row.get(0)?,
                        url: row.get(1)?,
                    })
                },
            )
            .optional()?;

        Ok(page)
    }

    fn claim_next_pending(&mut self) -> StorageResult<Option<PendingPage>> {
        let tx = self.conn.transaction()?;

        let page = tx
            .query_row(
                "SELECT id, url FROM Pages WHERE content IS NULL AND error IS NULL
                 AND id NOT IN (SELECT page_id FROM Claims)
                 ORDER BY RANDOM() LIMIT 1",
                [],
                |row| {
                    Ok(PendingPage {
                        id: row.get(0)?,
                        url: row.get(1)?,
                    })
                },
            )
            .optional()?;

        if let Some(page) = &page {
            tx.execute("INSERT INTO Claims (page_id) VALUES (?1)", params![page.id])?;
        }

        tx.commit()?;
        Ok(page)
    }

    fn release_claim(&mut self, page_id: i64) -> StorageResult<()> {
        self.conn
            .execute("DELETE FROM Claims WHERE page_id = ?1", params![page_id])?;
        Ok(())
    }

    fn release_all_claims(&mut self) -> StorageResult<()> {
        self.conn.execute("DELETE FROM Claims", [])?;
        Ok(())
    }

    // ===== Scope Management =====

    fn list_scopes(&self) -> StorageResult<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT url FROM Webs ORDER BY rowid")?;

        let scopes = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(scopes)
    }

    fn add_scope(&mut self, url: &str) -> StorageResult<()> {
        self.conn
            .execute("INSERT OR IGNORE INTO Webs (url) VALUES (?1)", params![url])?;
        Ok(())
    }

    // ===== Statistics =====

    fn count_pages(&self, kind: StatusKind) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM Pages WHERE {}", kind.sql_predicate()),
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn count_total_pages(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM Pages", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_links(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM Links", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

/// Inserts a pending page if absent and returns its ID
fn ensure_page_on(conn: &Connection, url: &str) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT OR IGNORE INTO Pages (url, content, old_rank, new_rank) VALUES (?1, NULL, ?2, ?2)",
        params![url, DEFAULT_RANK],
    )?;
    conn.query_row("SELECT id FROM Pages WHERE url = ?1", params![url], |row| {
        row.get(0)
    })
}

/// Inserts a link unless the ordered pair is already stored
fn insert_link_on(conn: &Connection, from_id: i64, to_id: i64) -> rusqlite::Result<bool> {
    let inserted = conn.execute(
        "INSERT INTO Links (from_id, to_id) SELECT ?1, ?2
         WHERE NOT EXISTS (SELECT 1 FROM Links WHERE from_id = ?1 AND to_id = ?2)",
        params![from_id, to_id],
    )?;
    Ok(inserted > 0)
}

fn page_from_row(row: &Row<'_>) -> rusqlite::Result<PageRecord> {
    let content = bytes_column(row, 2)?;
    let error: Option<i64> = row.get(3)?;

    Ok(PageRecord {
        id: row.get(0)?,
        url: row.get(1)?,
        status: PageStatus::from_columns(content, error),
        old_rank: row.get::<_, Option<f64>>(4)?.unwrap_or(DEFAULT_RANK),
        new_rank: row.get::<_, Option<f64>>(5)?.unwrap_or(DEFAULT_RANK),
    })
}

/// Reads page content stored either as BLOB or, by older crawlers, as TEXT
fn bytes_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Vec<u8>>> {
    match row.get_ref(idx)? {
        ValueRef::Null => Ok(None),
        ValueRef::Blob(bytes) | ValueRef::Text(bytes) => Ok(Some(bytes.to_vec())),
        other => Err(rusqlite::Error::InvalidColumnType(
            idx,
            "content".to_string(),
            other.data_type(),
        )),
    }
}
