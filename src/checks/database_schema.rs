//! Database schema check - required tables must exist in the SQLite database
//!
//! The database is opened read-only. Column metadata is recorded for every
//! table found, required or not; it is diagnostic only and never affects the
//! verdict. Driver errors are converted into a FAIL result backed by a
//! `database_error` artifact instead of propagating.

use anyhow::Result;
use rusqlite::{Connection, OpenFlags};
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::{Check, CheckContext, CheckKind, VerificationResult};
use crate::config::Specification;

/// Evidence kind for failures that prevented schema introspection
pub const DATABASE_ERROR_KIND: &str = "database_error";

pub struct DatabaseSchemaCheck;

/// Column metadata from `PRAGMA table_info`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub declared_type: String,
    pub not_null: bool,
    /// 1-based position in the primary key, 0 if not part of it
    pub primary_key: i64,
}

/// Why introspection could not run
#[derive(Debug)]
enum ProbeError {
    UnsupportedConnector(String),
    NotFound(PathBuf),
    Sqlite(rusqlite::Error),
}

impl ProbeError {
    fn category(&self) -> &'static str {
        match self {
            Self::UnsupportedConnector(_) => "UnsupportedConnector",
            Self::NotFound(_) => "DatabaseNotFound",
            Self::Sqlite(e) => sqlite_error_category(e),
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::UnsupportedConnector(c) => format!("Unsupported database connector: {c}"),
            Self::NotFound(path) => format!("Database file {} not found", path.display()),
            Self::Sqlite(e) => format!("Error checking database: {e}"),
        }
    }
}

impl From<rusqlite::Error> for ProbeError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Sqlite(e)
    }
}

fn sqlite_error_category(e: &rusqlite::Error) -> &'static str {
    match e {
        rusqlite::Error::SqliteFailure(err, _) => match err.code {
            rusqlite::ErrorCode::NotADatabase => "NotADatabase",
            rusqlite::ErrorCode::DatabaseCorrupt => "DatabaseCorrupt",
            rusqlite::ErrorCode::CannotOpen => "CannotOpen",
            rusqlite::ErrorCode::PermissionDenied => "PermissionDenied",
            rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked => {
                "DatabaseLocked"
            }
            _ => "SqliteFailure",
        },
        rusqlite::Error::InvalidPath(_) => "InvalidPath",
        rusqlite::Error::InvalidColumnType(..) | rusqlite::Error::FromSqlConversionFailure(..) => {
            "ConversionFailure"
        }
        _ => "DriverError",
    }
}

/// Extract the database file path from a connector string.
///
/// Accepts `sqlite:///<path>`, `sqlite://<path>` or a bare path. Returns
/// `None` for any other URL scheme.
pub fn sqlite_path(connector: &str) -> Option<&str> {
    let connector = connector.trim();
    if let Some(rest) = connector.strip_prefix("sqlite:///") {
        return Some(rest);
    }
    if let Some(rest) = connector.strip_prefix("sqlite://") {
        return Some(rest);
    }
    if connector.contains("://") {
        return None;
    }
    Some(connector)
}

/// Quote an identifier for use inside a PRAGMA argument.
fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// All table names in the database, sorted.
pub fn list_tables(conn: &Connection) -> rusqlite::Result<Vec<String>> {
    let mut stmt =
        conn.prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
    rows.collect()
}

/// Column metadata for one table, in declaration order.
pub fn list_columns(conn: &Connection, table: &str) -> rusqlite::Result<Vec<ColumnInfo>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", quote_identifier(table)))?;
    let rows = stmt.query_map([], |row| {
        Ok(ColumnInfo {
            name: row.get(1)?,
            declared_type: row.get(2)?,
            not_null: row.get::<_, i64>(3)? != 0,
            primary_key: row.get(5)?,
        })
    })?;
    rows.collect()
}

struct SchemaSnapshot {
    path: PathBuf,
    size_bytes: u64,
    tables: Vec<String>,
    columns: BTreeMap<String, Vec<ColumnInfo>>,
}

fn introspect(spec: &Specification, ctx: &CheckContext<'_>) -> Result<SchemaSnapshot, ProbeError> {
    let connector = &spec.database.connector;
    let raw_path = sqlite_path(connector)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ProbeError::UnsupportedConnector(connector.clone()))?;

    let path = ctx.resolve(raw_path);
    if !path.is_file() {
        return Err(ProbeError::NotFound(path));
    }

    let conn = Connection::open_with_flags(
        &path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;

    let tables = list_tables(&conn)?;
    let mut columns = BTreeMap::new();
    for table in &tables {
        columns.insert(table.clone(), list_columns(&conn, table)?);
    }

    let size_bytes = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);

    Ok(SchemaSnapshot {
        path,
        size_bytes,
        tables,
        columns,
    })
}

impl Check for DatabaseSchemaCheck {
    fn kind(&self) -> CheckKind {
        CheckKind::DatabaseSchema
    }

    fn execute(&self, spec: &Specification, ctx: &CheckContext<'_>) -> Result<VerificationResult> {
        info!(check = %self.kind(), connector = %spec.database.connector, "checking database schema");

        let component = self.kind().component();
        let check_type = self.kind().evidence_kind();
        let required = &spec.database.required_tables;

        let snapshot = match introspect(spec, ctx) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(check = %self.kind(), error_type = e.category(), "database introspection failed");
                let details = e.describe();
                let evidence =
                    ctx.record_error(DATABASE_ERROR_KIND, check_type, e.category(), &details)?;
                return Ok(VerificationResult::failed(
                    component,
                    details,
                    Some(evidence),
                ));
            }
        };

        let missing_tables: Vec<&String> = required
            .iter()
            .filter(|t| !snapshot.tables.contains(*t))
            .collect();

        let evidence = ctx.record(
            check_type,
            check_type,
            json!({
                "database_file": snapshot.path.display().to_string(),
                "database_size_bytes": snapshot.size_bytes,
                "required_tables": required,
                "existing_tables": snapshot.tables,
                "missing_tables": missing_tables,
                "table_schemas": snapshot.columns,
                "total_tables_required": required.len(),
                "total_tables_found": snapshot.tables.len(),
            }),
        )?;
        let evidence = Some(evidence);

        if !missing_tables.is_empty() {
            let names: Vec<&str> = missing_tables.iter().map(|t| t.as_str()).collect();
            return Ok(VerificationResult::failed(
                component,
                format!(
                    "Missing {} required tables: {}",
                    names.len(),
                    names.join(", ")
                ),
                evidence,
            ));
        }

        let details = if required.is_empty() {
            format!(
                "No required tables declared (nothing to check); {} tables present",
                snapshot.tables.len()
            )
        } else {
            format!("All {} required tables found", required.len())
        };
        Ok(VerificationResult::passed(component, details, evidence))
    }
}
