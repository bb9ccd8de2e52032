//! Candidate record selection and write-back using SQLite
//!
//! Rows are read with a coarse server-side pre-filter (a `REGEXP` over the
//! text column) and written back by id with bound parameters. Table and column
//! names are validated identifiers from [`TableTarget`]; every value is bound.

use crate::config::TableTarget;
use crate::error::{AnonymizeError, Result};
use chrono::{Days, NaiveDate};
use rusqlite::functions::FunctionFlags;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: i64,
    /// Day part of `created_at`, as SQLite's `DATE()` reads it.
    pub created_on: NaiveDate,
    pub text: String,
}

/// Filter for the candidate read.
#[derive(Debug, Clone)]
pub struct CandidateQuery<'a> {
    pub target: &'a TableTarget,
    pub age_days: i64,
    pub excluded_domain: &'a str,
}

/// Opens a database from a path or `sqlite:` URL. `:memory:` opens a private
/// in-memory database.
pub fn open_database(url: &str) -> Result<Connection> {
    let path = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .unwrap_or(url);

    let conn = if path == ":memory:" {
        Connection::open_in_memory()?
    } else {
        Connection::open(Path::new(path))?
    };

    register_regexp_function(&conn)?;
    info!("Opened database at {}", path);
    Ok(conn)
}

/// Installs `regexp(pattern, text)`, which backs SQLite's `text REGEXP pattern`.
///
/// Patterns go through `fancy_regex` so lookarounds are available. NULL text
/// never matches. Compiled patterns are cached per statement. A pattern that
/// gives up at runtime (backtracking limit) counts as a match, since the
/// function only serves as a pre-filter.
pub fn register_regexp_function(conn: &Connection) -> Result<()> {
    conn.create_scalar_function(
        "regexp",
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let pattern: Arc<fancy_regex::Regex> =
                ctx.get_or_create_aux(0, |value| -> std::result::Result<_, BoxError> {
                    Ok(fancy_regex::Regex::new(value.as_str()?)?)
                })?;

            let text: Option<String> = ctx.get(1)?;
            match text {
                Some(text) => match pattern.is_match(&text) {
                    Ok(matched) => Ok(matched),
                    Err(e) => {
                        debug!(
                            "regexp() gave up on a {} byte value, keeping it: {}",
                            text.len(),
                            e
                        );
                        Ok(true)
                    }
                },
                None => Ok(false),
            }
        },
    )?;

    debug!("Registered regexp() function");
    Ok(())
}

/// Case-insensitive pre-filter for rows that may hold a non-excluded address.
///
/// The lookahead only rejects an address whose domain *starts* with the
/// excluded text, which is not the same rule as the suffix check applied in
/// process. It narrows the read; it does not decide what gets redacted.
pub fn prefilter_pattern(excluded_domain: &str) -> String {
    format!(
        "(?i)[a-z0-9._+-]+@(?!{})[a-z0-9.-]+.[a-z]{{2,}}",
        regex::escape(excluded_domain)
    )
}

/// Rows created on or before `today - age_days` whose text column passes the
/// pre-filter, ordered by id.
pub fn select_candidates(
    conn: &Connection,
    query: &CandidateQuery<'_>,
    today: NaiveDate,
) -> Result<Vec<Record>> {
    let threshold = threshold_date(today, query.age_days)?;
    let column = query.target.quoted_column();
    let sql = format!(
        "SELECT id, DATE(created_at), {column} FROM {table}
         WHERE DATE(created_at) <= ?1 AND {column} IS NOT NULL AND {column} REGEXP ?2
         ORDER BY id",
        column = column,
        table = query.target.quoted_table(),
    );

    register_regexp_function(conn)?;

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        params![threshold, prefilter_pattern(query.excluded_domain)],
        |row| {
            Ok(Record {
                id: row.get(0)?,
                created_on: row.get(1)?,
                text: row.get(2)?,
            })
        },
    )?;

    let records = rows.collect::<std::result::Result<Vec<_>, _>>()?;
    info!(
        "Selected {} candidate records from {} created on or before {}",
        records.len(),
        query.target.table,
        threshold
    );
    Ok(records)
}

/// Stages the rewritten text for one row. Callers run this inside the
/// transaction they later commit or roll back.
pub fn update_text(conn: &Connection, target: &TableTarget, id: i64, text: &str) -> Result<usize> {
    let sql = format!(
        "UPDATE {} SET {} = ?1 WHERE id = ?2",
        target.quoted_table(),
        target.quoted_column()
    );

    let updated = conn.execute(&sql, params![text, id])?;
    debug!("Staged update for record {}", id);
    Ok(updated)
}

fn threshold_date(today: NaiveDate, age_days: i64) -> Result<NaiveDate> {
    let days = u64::try_from(age_days).map_err(|_| AnonymizeError::InvalidAge(age_days))?;
    today
        .checked_sub_days(Days::new(days))
        .ok_or(AnonymizeError::InvalidAge(age_days))
}
