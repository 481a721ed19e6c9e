//! Database schema definitions
//!
//! The table layout is shared with the ranking tools that read the graph, so
//! column names and types stay stable.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Every discovered URL; content/error record the fetch outcome
CREATE TABLE IF NOT EXISTS Pages (
    id INTEGER PRIMARY KEY,
    url TEXT UNIQUE,
    content BLOB,
    error INTEGER,
    old_rank REAL DEFAULT 1.0,
    new_rank REAL DEFAULT 1.0
);

-- Directed edges of the page graph
CREATE TABLE IF NOT EXISTS Links (
    from_id INTEGER,
    to_id INTEGER
);

CREATE INDEX IF NOT EXISTS idx_links_from ON Links(from_id);
CREATE INDEX IF NOT EXISTS idx_links_to ON Links(to_id);

-- Registered scope prefixes
CREATE TABLE IF NOT EXISTS Webs (url TEXT UNIQUE);
"#;

/// Connection-local claim table
///
/// TEMP tables vanish with the connection, so a page claimed by a worker
/// that never finished is pending again after a restart.
pub const CLAIMS_SQL: &str = r#"
CREATE TEMP TABLE IF NOT EXISTS Claims (
    page_id INTEGER PRIMARY KEY
);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute_batch(CLAIMS_SQL)?;
    Ok(())
}
